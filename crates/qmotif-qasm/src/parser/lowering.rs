//! AST-to-circuit lowering.

use qmotif_ir::{Circuit, Decomposer, Flattened, Rule, WireId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::ast::{BodyCall, Operand, Program, Statement};
use crate::error::{ParseError, ParseResult};

/// A lowered program: the raw operation stream plus the `gate` definitions
/// found in the file.
#[derive(Debug, Clone)]
pub struct Parsed {
    /// Circuit in source order, not yet flattened.
    pub circuit: Circuit,
    /// Rules built from `gate` definitions, in definition order.
    pub rules: Vec<Rule>,
}

impl Parsed {
    /// Flatten with `decomposer` extended by this file's own rules.
    ///
    /// File-local definitions replace built-in rules of the same name.
    pub fn flatten(&self, decomposer: &Decomposer) -> Flattened {
        let mut decomposer = decomposer.clone();
        for rule in &self.rules {
            decomposer.add_rule(rule.clone());
        }
        decomposer.flatten(&self.circuit)
    }
}

/// Lower an AST Program.
pub(crate) fn lower(program: &Program) -> ParseResult<Parsed> {
    let mut lowerer = Lowerer::default();
    for stmt in &program.statements {
        lowerer.lower_statement(stmt)?;
    }
    Ok(Parsed {
        circuit: lowerer.circuit,
        rules: lowerer.rules,
    })
}

struct Lowerer {
    circuit: Circuit,
    /// Quantum registers: name -> global wire ids.
    qregs: FxHashMap<String, Vec<WireId>>,
    /// Classical register names, tracked only for duplicate detection.
    cregs: FxHashSet<String>,
    rules: Vec<Rule>,
}

impl Default for Lowerer {
    fn default() -> Self {
        Self {
            circuit: Circuit::new("qasm_circuit"),
            qregs: FxHashMap::default(),
            cregs: FxHashSet::default(),
            rules: Vec::new(),
        }
    }
}

impl Lowerer {
    fn lower_statement(&mut self, stmt: &Statement) -> ParseResult<()> {
        match stmt {
            Statement::Include(_) => Ok(()),

            Statement::QubitDecl { name, size } => {
                self.check_fresh(name)?;
                let ids = self.circuit.add_qreg(name, *size);
                self.qregs.insert(name.clone(), ids);
                Ok(())
            }

            Statement::BitDecl { name, .. } => {
                self.check_fresh(name)?;
                self.cregs.insert(name.clone());
                Ok(())
            }

            Statement::GateCall { name, operands } => {
                for wires in self.broadcast(name, operands)? {
                    self.circuit.push(name.as_str(), wires)?;
                }
                Ok(())
            }

            Statement::Measure { operands } => self.lower_per_wire("measure", operands),
            Statement::Reset { operands } => self.lower_per_wire("reset", operands),

            Statement::Barrier { operands } => {
                let wires: Vec<WireId> = if operands.is_empty() {
                    self.circuit.wires().iter().map(|w| w.id).collect()
                } else {
                    let mut seen = FxHashSet::default();
                    let mut wires = Vec::new();
                    for operand in operands {
                        for wire in self.resolve(operand)? {
                            if seen.insert(wire) {
                                wires.push(wire);
                            }
                        }
                    }
                    wires
                };
                if !wires.is_empty() {
                    self.circuit.push("barrier", wires)?;
                }
                Ok(())
            }

            Statement::GateDef { name, qubits, body } => {
                let rule = build_rule(name, qubits, body)?;
                self.rules.push(rule);
                Ok(())
            }

            Statement::Opaque { name, arity } => {
                debug!("Opaque gate '{name}' ({arity} wires) will stay unexpanded");
                Ok(())
            }

            Statement::Conditional(inner) => self.lower_statement(inner),
        }
    }

    fn check_fresh(&self, name: &str) -> ParseResult<()> {
        if self.qregs.contains_key(name) || self.cregs.contains(name) {
            return Err(ParseError::DuplicateDeclaration(name.to_string()));
        }
        Ok(())
    }

    fn resolve(&self, operand: &Operand) -> ParseResult<Vec<WireId>> {
        let register = self
            .qregs
            .get(&operand.register)
            .ok_or_else(|| ParseError::UndefinedIdentifier(operand.register.clone()))?;

        match operand.index {
            None => Ok(register.clone()),
            Some(index) => {
                #[allow(clippy::cast_possible_truncation)]
                let size = register.len() as u32;
                let wire = usize::try_from(index)
                    .ok()
                    .and_then(|i| register.get(i))
                    .ok_or_else(|| ParseError::IndexOutOfBounds {
                        register: operand.register.clone(),
                        index,
                        size,
                    })?;
                Ok(vec![*wire])
            }
        }
    }

    /// Expand whole-register operands into one wire list per application.
    ///
    /// Indexed operands repeat across every application; all whole-register
    /// operands must have the same size.
    fn broadcast(&self, name: &str, operands: &[Operand]) -> ParseResult<Vec<Vec<WireId>>> {
        let resolved: Vec<(bool, Vec<WireId>)> = operands
            .iter()
            .map(|op| Ok((op.index.is_none(), self.resolve(op)?)))
            .collect::<ParseResult<_>>()?;

        let mut width = None;
        for (whole, wires) in &resolved {
            if *whole {
                match width {
                    None => width = Some(wires.len()),
                    Some(w) if w != wires.len() => {
                        return Err(ParseError::BroadcastMismatch {
                            operation: name.to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        let Some(width) = width else {
            return Ok(vec![resolved.into_iter().flat_map(|(_, w)| w).collect()]);
        };

        Ok((0..width)
            .map(|i| {
                resolved
                    .iter()
                    .map(|(whole, wires)| if *whole { wires[i] } else { wires[0] })
                    .collect()
            })
            .collect())
    }

    fn lower_per_wire(&mut self, name: &str, operands: &[Operand]) -> ParseResult<()> {
        for operand in operands {
            for wire in self.resolve(operand)? {
                self.circuit.push(name, [wire])?;
            }
        }
        Ok(())
    }
}

fn build_rule(name: &str, qubits: &[String], body: &[BodyCall]) -> ParseResult<Rule> {
    let slots: FxHashMap<&str, usize> = qubits
        .iter()
        .enumerate()
        .map(|(i, q)| (q.as_str(), i))
        .collect();

    let mut expansion = Vec::with_capacity(body.len());
    for call in body {
        let args = call
            .args
            .iter()
            .map(|arg| {
                slots
                    .get(arg.as_str())
                    .copied()
                    .ok_or_else(|| ParseError::UndefinedIdentifier(format!("{arg} in gate {name}")))
            })
            .collect::<ParseResult<Vec<_>>>()?;
        expansion.push((call.name.clone(), args));
    }

    Ok(Rule::new(name, qubits.len(), expansion)?)
}
