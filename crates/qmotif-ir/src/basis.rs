//! Basis gate vocabulary.

use rustc_hash::FxHashSet;

/// Set of operation names that are left untouched by decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisSet {
    gates: FxHashSet<String>,
}

impl BasisSet {
    /// Create a basis from gate names.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// The mining vocabulary.
    ///
    /// `swap` and `cswap` are left out on purpose so they expand into
    /// `cx`/`ccx` and show up as interactions.
    pub fn standard() -> Self {
        Self::new([
            "u1", "u2", "u3", "u", "p", "i", "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg",
            "rx", "ry", "rz", "cx", "cy", "cz", "ch", "ccx", "measure", "barrier", "reset",
            "snapshot", "delay",
        ])
    }

    /// Check if a gate is in the basis.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.contains(gate)
    }

    /// Add a gate to the basis.
    pub fn insert(&mut self, gate: impl Into<String>) {
        self.gates.insert(gate.into());
    }

    /// Number of gates in the basis.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the basis is empty.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl Default for BasisSet {
    fn default() -> Self {
        Self::standard()
    }
}
