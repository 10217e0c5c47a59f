//! Error types for graph construction and export.

use std::path::PathBuf;

use thiserror::Error;

use crate::multigraph::NodeId;

/// Errors that can occur while building or exporting graphs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GraphError {
    /// Edge endpoint not present in the graph.
    #[error("Node {0} not found in graph")]
    NodeNotFound(NodeId),

    /// Export format not recognised from the file extension.
    #[error("Unsupported export format for {}: expected .json or .dot", .0.display())]
    UnsupportedFormat(PathBuf),

    /// JSON serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing an export file failed.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// Destination file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
