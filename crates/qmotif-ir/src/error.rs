//! Error types for the IR crate.

use crate::wire::WireId;
use thiserror::Error;

/// Errors that can occur while building circuits or decomposition rules.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Wire not declared in the circuit.
    #[error("Wire {wire} not found in circuit{}", format_op_context(.operation))]
    WireNotFound {
        /// The wire that was not found.
        wire: WireId,
        /// Optional operation name for context.
        operation: Option<String>,
    },

    /// The same wire appears twice in one operation.
    #[error("Duplicate wire {wire} in operation{}", format_op_context(.operation))]
    DuplicateWire {
        /// The duplicate wire.
        wire: WireId,
        /// Optional operation name for context.
        operation: Option<String>,
    },

    /// Decomposition rule refers to a slot outside its arity.
    #[error("Rule '{rule}' references slot {slot} but only has {arity} wires")]
    InvalidRuleSlot {
        /// Name of the rule.
        rule: String,
        /// The offending slot.
        slot: usize,
        /// Number of formal wires of the rule.
        arity: usize,
    },

    /// Rule applied to an operation with the wrong number of wires.
    #[error("Rule '{rule}' expects {expected} wires, got {got}")]
    ArityMismatch {
        /// Name of the rule.
        rule: String,
        /// Expected number of wires.
        expected: usize,
        /// Actual number of wires.
        got: usize,
    },
}

#[allow(clippy::ref_option)]
fn format_op_context(operation: &Option<String>) -> String {
    match operation {
        Some(name) => format!(" (operation: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
