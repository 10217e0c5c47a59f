//! qmotif Circuit Representation
//!
//! This crate holds the flattened, wire-ordered view of a quantum circuit that
//! the graph builders consume. Circuits here are plain operation streams: an
//! ordered list of wires and an ordered list of operations, each naming the
//! wires it touches.
//!
//! # Core Components
//!
//! - **Wires**: [`WireId`] is the global index of a qubit, assigned in
//!   declaration order across all registers. [`Wire`] keeps the register name
//!   and register-local index for display.
//! - **Operations**: [`Operation`] is a gate/instruction name plus its wires.
//! - **Circuit**: [`Circuit`] is the ordered stream with builder helpers.
//! - **Basis**: [`BasisSet`] is the vocabulary the miner expects.
//! - **Decomposition**: [`Decomposer`] expands non-basis operations with a
//!   bounded number of passes.
//! - **Sources**: [`CircuitSource`] loads circuits from files.
//!
//! # Example: Flattening a SWAP
//!
//! ```rust
//! use qmotif_ir::{Circuit, Decomposer, WireId};
//!
//! let mut circuit = Circuit::with_wires("swap", 2);
//! circuit.push("swap", [WireId(0), WireId(1)]).unwrap();
//!
//! let flat = Decomposer::standard().flatten(&circuit);
//! assert!(flat.converged);
//! assert_eq!(flat.circuit.num_operations(), 3);
//! assert!(flat.circuit.operations().iter().all(|op| op.name == "cx"));
//! ```

pub mod basis;
pub mod circuit;
pub mod decompose;
pub mod error;
pub mod operation;
pub mod source;
pub mod wire;

pub use basis::BasisSet;
pub use circuit::Circuit;
pub use decompose::{DEFAULT_MAX_PASSES, Decomposer, Flattened, Rule};
pub use error::{IrError, IrResult};
pub use operation::Operation;
pub use source::{CircuitSource, SourceError, SourceResult};
pub use wire::{Wire, WireId};
