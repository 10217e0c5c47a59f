//! Bounded-pass decomposition into the basis vocabulary.
//!
//! Each pass expands every non-basis operation that has a [`Rule`] by one
//! level. Passes repeat until the stream is all-basis, a pass makes no
//! progress, or the pass cap is reached. Whatever remains unexpanded is kept
//! as an opaque operation so downstream graph building never fails on it.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::basis::BasisSet;
use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};
use crate::operation::Operation;
use crate::wire::WireId;

/// Maximum number of decomposition passes before giving up.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Expansion of a named operation over formal wire slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    arity: usize,
    body: Vec<(String, Vec<usize>)>,
}

impl Rule {
    /// Create a rule. Every slot in `body` must be below `arity`.
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        body: impl IntoIterator<Item = (String, Vec<usize>)>,
    ) -> IrResult<Self> {
        let name = name.into();
        let body: Vec<_> = body.into_iter().collect();
        for (_, slots) in &body {
            if let Some(&slot) = slots.iter().find(|&&s| s >= arity) {
                return Err(IrError::InvalidRuleSlot {
                    rule: name,
                    slot,
                    arity,
                });
            }
        }
        Ok(Self { name, arity, body })
    }

    /// Shorthand used by the built-in table.
    fn builtin(name: &str, arity: usize, body: &[(&str, &[usize])]) -> Self {
        Self {
            name: name.to_string(),
            arity,
            body: body
                .iter()
                .map(|(op, slots)| ((*op).to_string(), slots.to_vec()))
                .collect(),
        }
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of formal wires.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Expand the rule onto concrete wires.
    pub fn expand(&self, wires: &[WireId]) -> IrResult<Vec<Operation>> {
        if wires.len() != self.arity {
            return Err(IrError::ArityMismatch {
                rule: self.name.clone(),
                expected: self.arity,
                got: wires.len(),
            });
        }
        Ok(self
            .body
            .iter()
            .map(|(name, slots)| Operation::new(name.clone(), slots.iter().map(|&s| wires[s])))
            .collect())
    }
}

/// Outcome of [`Decomposer::flatten`].
#[derive(Debug, Clone)]
pub struct Flattened {
    /// The flattened circuit.
    pub circuit: Circuit,
    /// Number of passes that ran.
    pub passes: usize,
    /// Whether every remaining operation is in the basis.
    pub converged: bool,
    /// Names of operations left unexpanded.
    pub opaque: BTreeSet<String>,
}

/// Rule table plus basis, applied with a pass cap.
#[derive(Debug, Clone)]
pub struct Decomposer {
    basis: BasisSet,
    rules: FxHashMap<String, Rule>,
    max_passes: usize,
}

impl Decomposer {
    /// Decomposer with no rules.
    pub fn new(basis: BasisSet) -> Self {
        Self {
            basis,
            rules: FxHashMap::default(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Standard basis with the built-in rule table.
    pub fn standard() -> Self {
        let mut decomposer = Self::new(BasisSet::standard());
        for rule in builtin_rules() {
            decomposer.add_rule(rule);
        }
        decomposer
    }

    /// Override the pass cap.
    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Register a rule, replacing any rule of the same name.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.insert(rule.name.clone(), rule);
    }

    /// Look up a rule.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// The basis in use.
    pub fn basis(&self) -> &BasisSet {
        &self.basis
    }

    /// Expand non-basis operations until convergence or the pass cap.
    pub fn flatten(&self, circuit: &Circuit) -> Flattened {
        let mut ops = circuit.operations().to_vec();
        let mut passes = 0;
        let mut converged = self.all_basis(&ops);

        while !converged && passes < self.max_passes {
            passes += 1;
            let mut progressed = false;
            let mut next = Vec::with_capacity(ops.len());

            for op in ops {
                if self.basis.contains(&op.name) {
                    next.push(op);
                    continue;
                }
                match self.rules.get(&op.name).map(|r| r.expand(&op.wires)) {
                    Some(Ok(expanded)) => {
                        progressed = true;
                        next.extend(expanded);
                    }
                    Some(Err(e)) => {
                        debug!("Keeping '{}' opaque: {e}", op.name);
                        next.push(op);
                    }
                    None => next.push(op),
                }
            }

            ops = next;
            converged = self.all_basis(&ops);
            if !progressed {
                break;
            }
        }

        let opaque: BTreeSet<String> = ops
            .iter()
            .filter(|op| !self.basis.contains(&op.name))
            .map(|op| op.name.clone())
            .collect();

        if !converged {
            warn!(
                "Decomposition of '{}' did not converge after {passes} passes; keeping {:?} opaque",
                circuit.name(),
                opaque
            );
        }

        Flattened {
            circuit: circuit.with_operations(ops),
            passes,
            converged,
            opaque,
        }
    }

    fn all_basis(&self, ops: &[Operation]) -> bool {
        ops.iter().all(|op| self.basis.contains(&op.name))
    }
}

impl Default for Decomposer {
    fn default() -> Self {
        Self::standard()
    }
}

/// Structural expansions of common non-basis gates.
///
/// Only names and wire order matter for mining, so rotation angles are not
/// tracked.
fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule::builtin("swap", 2, &[("cx", &[0, 1]), ("cx", &[1, 0]), ("cx", &[0, 1])]),
        Rule::builtin(
            "cswap",
            3,
            &[("cx", &[2, 1]), ("ccx", &[0, 1, 2]), ("cx", &[2, 1])],
        ),
        Rule::builtin(
            "iswap",
            2,
            &[
                ("s", &[0]),
                ("s", &[1]),
                ("h", &[0]),
                ("cx", &[0, 1]),
                ("cx", &[1, 0]),
                ("h", &[1]),
            ],
        ),
        Rule::builtin("sx", 1, &[("sdg", &[0]), ("h", &[0]), ("sdg", &[0])]),
        Rule::builtin("sxdg", 1, &[("s", &[0]), ("h", &[0]), ("s", &[0])]),
        Rule::builtin(
            "cp",
            2,
            &[
                ("p", &[0]),
                ("cx", &[0, 1]),
                ("p", &[1]),
                ("cx", &[0, 1]),
                ("p", &[1]),
            ],
        ),
        Rule::builtin(
            "cu1",
            2,
            &[
                ("u1", &[0]),
                ("cx", &[0, 1]),
                ("u1", &[1]),
                ("cx", &[0, 1]),
                ("u1", &[1]),
            ],
        ),
        Rule::builtin(
            "crz",
            2,
            &[("rz", &[1]), ("cx", &[0, 1]), ("rz", &[1]), ("cx", &[0, 1])],
        ),
        Rule::builtin(
            "cry",
            2,
            &[("ry", &[1]), ("cx", &[0, 1]), ("ry", &[1]), ("cx", &[0, 1])],
        ),
        Rule::builtin(
            "crx",
            2,
            &[
                ("u1", &[1]),
                ("cx", &[0, 1]),
                ("u3", &[1]),
                ("cx", &[0, 1]),
                ("u3", &[1]),
            ],
        ),
        Rule::builtin(
            "cu3",
            2,
            &[
                ("u1", &[0]),
                ("u1", &[1]),
                ("cx", &[0, 1]),
                ("u3", &[1]),
                ("cx", &[0, 1]),
                ("u3", &[1]),
            ],
        ),
        Rule::builtin(
            "cu",
            2,
            &[
                ("p", &[0]),
                ("p", &[1]),
                ("cx", &[0, 1]),
                ("u", &[1]),
                ("cx", &[0, 1]),
                ("u", &[1]),
            ],
        ),
        Rule::builtin("rzz", 2, &[("cx", &[0, 1]), ("rz", &[1]), ("cx", &[0, 1])]),
        Rule::builtin(
            "rxx",
            2,
            &[
                ("h", &[0]),
                ("h", &[1]),
                ("cx", &[0, 1]),
                ("rz", &[1]),
                ("cx", &[0, 1]),
                ("h", &[0]),
                ("h", &[1]),
            ],
        ),
        Rule::builtin("ccz", 3, &[("h", &[2]), ("ccx", &[0, 1, 2]), ("h", &[2])]),
    ]
}
