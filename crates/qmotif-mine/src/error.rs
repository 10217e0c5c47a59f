//! Error types for the mining crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::pool::PoolError;

/// Errors that abort a mining run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MineError {
    /// Discovery found nothing to mine.
    #[error("No input files found in {}", describe(.0))]
    NoInputs(Vec<PathBuf>),

    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A mining task panicked.
    #[error("Worker failed on {task}: {message}")]
    WorkerFailed {
        /// Description of the failed task.
        task: String,
        /// Panic message.
        message: String,
    },

    /// The worker pool could not be created.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// An input path could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

fn describe(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no paths given)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for mining operations.
pub type MineResult<T> = Result<T, MineError>;
