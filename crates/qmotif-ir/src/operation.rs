//! Circuit operations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::wire::WireId;

/// Operations that never carry interaction semantics, regardless of arity.
pub const NON_INTERACTING: &[&str] = &["barrier", "snapshot", "delay"];

/// One gate or instruction application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// Lower-case operation name (`cx`, `h`, `measure`, ...).
    pub name: String,
    /// Wires in the order the operation lists them.
    pub wires: Vec<WireId>,
}

impl Operation {
    /// Create a new operation.
    pub fn new(name: impl Into<String>, wires: impl IntoIterator<Item = WireId>) -> Self {
        Self {
            name: name.into(),
            wires: wires.into_iter().collect(),
        }
    }

    /// Number of wires touched.
    #[inline]
    pub fn arity(&self) -> usize {
        self.wires.len()
    }

    /// Whether this is a barrier-like instruction with no interaction meaning.
    pub fn is_non_interacting(&self) -> bool {
        NON_INTERACTING.contains(&self.name.as_str())
    }

    /// Whether the operation couples two or more wires.
    pub fn is_interaction(&self) -> bool {
        self.arity() > 1 && !self.is_non_interacting()
    }

    /// Mean wire index, used for layout only.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_wire(&self) -> f64 {
        if self.wires.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.wires.iter().map(|w| u64::from(w.0)).sum();
        sum as f64 / self.wires.len() as f64
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (i, wire) in self.wires.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{wire}")?;
        }
        Ok(())
    }
}
