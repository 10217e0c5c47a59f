//! File loading for the mining pipeline.

use std::path::Path;

use qmotif_ir::{Circuit, CircuitSource, Decomposer, SourceError, SourceResult};
use tracing::debug;

use crate::parser::parse;

/// Reads `.qasm` files and flattens them with a [`Decomposer`].
#[derive(Debug, Clone, Default)]
pub struct QasmSource {
    decomposer: Decomposer,
}

impl QasmSource {
    /// Source using the standard basis and built-in rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Source using a custom decomposer.
    pub fn with_decomposer(decomposer: Decomposer) -> Self {
        Self { decomposer }
    }

    /// Parse and flatten QASM text, naming the circuit `name`.
    pub fn load_str(&self, name: &str, source: &str) -> crate::ParseResult<Circuit> {
        let parsed = parse(source)?;
        let flat = parsed.flatten(&self.decomposer);
        debug!(
            "Flattened '{name}': {} -> {} operations in {} passes",
            parsed.circuit.num_operations(),
            flat.circuit.num_operations(),
            flat.passes
        );
        let mut circuit = flat.circuit;
        circuit.set_name(name);
        Ok(circuit)
    }
}

impl CircuitSource for QasmSource {
    fn load(&self, path: &Path) -> SourceResult<Circuit> {
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map_or_else(|| "qasm_circuit".to_string(), |s| s.to_string_lossy().into_owned());

        self.load_str(&name, &text).map_err(|e| SourceError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn extension(&self) -> &str {
        "qasm"
    }
}
