//! Loading circuits from files.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::circuit::Circuit;

/// Errors raised while loading a circuit from a file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed into a circuit.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

/// Result type for circuit loading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Produces flattened circuits from files.
///
/// Implementations must return operations already expanded into the basis
/// vocabulary (best effort, see [`crate::Decomposer`]).
pub trait CircuitSource: Send + Sync {
    /// Load and flatten the circuit stored at `path`.
    fn load(&self, path: &Path) -> SourceResult<Circuit>;

    /// File extension (without dot) this source understands.
    fn extension(&self) -> &str;
}
