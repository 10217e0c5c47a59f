//! `OpenQASM` reader for qmotif
//!
//! Turns `OpenQASM` 2 and 3 files into flattened [`qmotif_ir::Circuit`]s.
//! Only the wire structure matters for mining, so parameter expressions,
//! classical targets and `if` conditions are parsed and discarded.
//!
//! # Supported Features
//!
//! | Feature | Example |
//! |---------|---------|
//! | Version declaration (optional) | `OPENQASM 2.0;` |
//! | Registers | `qreg q[5];`, `qubit[5] q;` |
//! | Classical bits | `creg c[5];`, `bit[5] c;` |
//! | Gate calls with parameters | `u3(pi/2,0,pi) q[0];` |
//! | Register broadcasting | `cx a, b;` |
//! | Measurement | `measure q -> c;`, `c = measure q;` |
//! | Barrier and reset | `barrier q;`, `reset q[0];` |
//! | Conditionals | `if (c==1) x q[0];` |
//! | Gate definitions | `gate maj a,b,c { ... }` |
//! | Opaque gates | `opaque magic a;` |
//!
//! Gate modifiers (`ctrl @`, `inv @`) and control flow blocks are rejected.
//!
//! # Example
//!
//! ```rust
//! use qmotif_ir::Decomposer;
//! use qmotif_qasm::parse;
//!
//! let qasm = r#"
//!     OPENQASM 2.0;
//!     include "qelib1.inc";
//!     qreg q[2];
//!     h q[0];
//!     swap q[0], q[1];
//! "#;
//!
//! let parsed = parse(qasm).unwrap();
//! assert_eq!(parsed.circuit.num_operations(), 2);
//!
//! let flat = parsed.flatten(&Decomposer::standard());
//! assert!(flat.converged);
//! assert_eq!(flat.circuit.num_operations(), 4);
//! ```

pub mod ast;
mod error;
mod lexer;
mod parser;
mod source;

pub use error::{ParseError, ParseResult};
pub use parser::{Parsed, parse, parse_program};
pub use source::QasmSource;
