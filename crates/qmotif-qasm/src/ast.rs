//! Abstract syntax tree for the supported `OpenQASM` subset.

/// A parsed program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// `OPENQASM` version, if declared.
    pub version: Option<String>,
    /// Statements in source order.
    pub statements: Vec<Statement>,
}

/// A register or single-wire reference, e.g. `q` or `q[3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    /// Register name.
    pub register: String,
    /// Index within the register; `None` means the whole register.
    pub index: Option<u64>,
}

/// One call inside a `gate` body, over formal argument names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyCall {
    /// Called operation name (lower-case).
    pub name: String,
    /// Formal qubit arguments.
    pub args: Vec<String>,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `include "file";` (ignored during lowering).
    Include(String),
    /// `qreg q[n];`, `qubit[n] q;` or `qubit q;`.
    QubitDecl { name: String, size: u32 },
    /// `creg c[n];` or `bit[n] c;`.
    BitDecl { name: String, size: u32 },
    /// Gate application.
    GateCall { name: String, operands: Vec<Operand> },
    /// Measurement; classical targets are irrelevant for mining.
    Measure { operands: Vec<Operand> },
    /// Reset.
    Reset { operands: Vec<Operand> },
    /// Barrier; an empty operand list spans all wires.
    Barrier { operands: Vec<Operand> },
    /// `gate name(params) a, b { ... }`.
    GateDef {
        name: String,
        qubits: Vec<String>,
        body: Vec<BodyCall>,
    },
    /// `opaque name(params) a, b;`.
    Opaque { name: String, arity: usize },
    /// `if (cond) stmt`; the condition is discarded.
    Conditional(Box<Statement>),
}
