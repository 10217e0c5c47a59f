//! Ordered operation stream over declared wires.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::operation::Operation;
use crate::wire::{Wire, WireId};

/// A circuit as an ordered operation stream.
///
/// Operations are kept in source order, which is already a valid topological
/// order of the circuit. Wire ids are dense and follow declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Declared wires, indexed by `WireId`.
    wires: Vec<Wire>,
    /// Operations in stream order.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wires: vec![],
            operations: vec![],
        }
    }

    /// Create a circuit with `num_wires` anonymous wires.
    pub fn with_wires(name: impl Into<String>, num_wires: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_wires {
            circuit.add_wire();
        }
        circuit
    }

    /// Add a single anonymous wire.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_wire(&mut self) -> WireId {
        let id = WireId(self.wires.len() as u32);
        self.wires.push(Wire::new(id));
        id
    }

    /// Add a register of `size` wires. Ids continue the global numbering.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<WireId> {
        let name = name.into();
        let mut ids = Vec::with_capacity(size as usize);
        for i in 0..size {
            let id = WireId(self.wires.len() as u32);
            self.wires.push(Wire::with_register(id, &name, i));
            ids.push(id);
        }
        ids
    }

    /// Append an operation after validating its wires.
    pub fn push(
        &mut self,
        name: impl Into<String>,
        wires: impl IntoIterator<Item = WireId>,
    ) -> IrResult<&mut Self> {
        let op = Operation::new(name, wires);
        self.validate(&op)?;
        self.operations.push(op);
        Ok(self)
    }

    /// Append an already-built operation after validating its wires.
    pub fn push_operation(&mut self, op: Operation) -> IrResult<&mut Self> {
        self.validate(&op)?;
        self.operations.push(op);
        Ok(self)
    }

    fn validate(&self, op: &Operation) -> IrResult<()> {
        let mut seen = FxHashSet::default();
        for &wire in &op.wires {
            if wire.index() >= self.wires.len() {
                return Err(IrError::WireNotFound {
                    wire,
                    operation: Some(op.name.clone()),
                });
            }
            if !seen.insert(wire) {
                return Err(IrError::DuplicateWire {
                    wire,
                    operation: Some(op.name.clone()),
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Convenience gates
    // =========================================================================

    /// Apply an X gate.
    pub fn x(&mut self, wire: WireId) -> IrResult<&mut Self> {
        self.push("x", [wire])
    }

    /// Apply a Hadamard gate.
    pub fn h(&mut self, wire: WireId) -> IrResult<&mut Self> {
        self.push("h", [wire])
    }

    /// Apply a CNOT.
    pub fn cx(&mut self, control: WireId, target: WireId) -> IrResult<&mut Self> {
        self.push("cx", [control, target])
    }

    /// Apply a CZ.
    pub fn cz(&mut self, control: WireId, target: WireId) -> IrResult<&mut Self> {
        self.push("cz", [control, target])
    }

    /// Apply a Toffoli.
    pub fn ccx(&mut self, c1: WireId, c2: WireId, target: WireId) -> IrResult<&mut Self> {
        self.push("ccx", [c1, c2, target])
    }

    /// Apply a SWAP. Not a basis gate; flattening expands it.
    pub fn swap(&mut self, a: WireId, b: WireId) -> IrResult<&mut Self> {
        self.push("swap", [a, b])
    }

    /// Measure a wire.
    pub fn measure(&mut self, wire: WireId) -> IrResult<&mut Self> {
        self.push("measure", [wire])
    }

    /// Barrier across every declared wire.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let wires: Vec<_> = self.wires.iter().map(|w| w.id).collect();
        self.push("barrier", wires)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the circuit.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Declared wires in global order.
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Number of declared wires.
    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }

    /// Operations in stream order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    pub fn num_operations(&self) -> usize {
        self.operations.len()
    }

    /// Same wires, different operation stream. Operations are trusted to
    /// reference existing wires.
    pub(crate) fn with_operations(&self, operations: Vec<Operation>) -> Self {
        Self {
            name: self.name.clone(),
            wires: self.wires.clone(),
            operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_circuit() {
        let circuit = Circuit::new("test");
        assert_eq!(circuit.name(), "test");
        assert_eq!(circuit.num_wires(), 0);
        assert_eq!(circuit.num_operations(), 0);
    }

    #[test]
    fn test_registers_number_globally() {
        let mut circuit = Circuit::new("regs");
        let a = circuit.add_qreg("a", 2);
        let b = circuit.add_qreg("b", 2);

        assert_eq!(a, vec![WireId(0), WireId(1)]);
        assert_eq!(b, vec![WireId(2), WireId(3)]);
        assert_eq!(circuit.wires()[2].to_string(), "b[0]");
    }

    #[test]
    fn test_builder_chain() {
        let mut circuit = Circuit::with_wires("chain", 2);
        circuit
            .x(WireId(0))
            .unwrap()
            .x(WireId(1))
            .unwrap()
            .cx(WireId(0), WireId(1))
            .unwrap();
        assert_eq!(circuit.num_operations(), 3);
        assert_eq!(circuit.operations()[2].name, "cx");
    }

    #[test]
    fn test_unknown_wire_rejected() {
        let mut circuit = Circuit::with_wires("bad", 1);
        let err = circuit.cx(WireId(0), WireId(5)).unwrap_err();
        assert!(matches!(err, IrError::WireNotFound { wire: WireId(5), .. }));
        assert!(err.to_string().contains("operation: cx"));
    }

    #[test]
    fn test_duplicate_wire_rejected() {
        let mut circuit = Circuit::with_wires("dup", 2);
        let err = circuit.cx(WireId(1), WireId(1)).unwrap_err();
        assert!(matches!(err, IrError::DuplicateWire { .. }));
    }
}
