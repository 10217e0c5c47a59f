//! Mining results.

use std::path::PathBuf;

use qmotif_graph::{CircuitGraph, GraphMode};
use serde::Serialize;

use crate::canon::{CanonicalHash, LabelMode};

/// One ranked pattern.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPattern {
    /// 1-based rank.
    pub rank: usize,
    /// Structural hash.
    pub hash: CanonicalHash,
    /// Variant index under `hash` (non-zero only with collision checks).
    pub variant: usize,
    /// Occurrences.
    pub count: u64,
    /// `count / total_examined`.
    pub frequency: f64,
    /// Representative subgraph.
    pub exemplar: CircuitGraph,
    /// File written by the renderer, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<PathBuf>,
}

impl RankedPattern {
    /// Node labels of the exemplar.
    pub fn node_labels(&self) -> Vec<String> {
        self.exemplar.node_labels()
    }

    /// Edge records in the exemplar.
    pub fn edge_count(&self) -> usize {
        self.exemplar.edge_count()
    }
}

/// Results for one subgraph size.
#[derive(Debug, Clone, Serialize)]
pub struct LevelReport {
    pub k: usize,
    pub total_examined: u64,
    pub unique_patterns: usize,
    pub top: Vec<RankedPattern>,
}

/// Results of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct MiningReport {
    /// Name used for the output directory.
    pub benchmark: String,
    pub mode: GraphMode,
    pub label_mode: LabelMode,
    /// Seed every sampling task was derived from.
    pub seed: u64,
    pub files_found: usize,
    pub graphs_built: usize,
    /// Inputs that could not be loaded, with the reason.
    pub failed_files: Vec<(PathBuf, String)>,
    pub levels: Vec<LevelReport>,
}

impl MiningReport {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
