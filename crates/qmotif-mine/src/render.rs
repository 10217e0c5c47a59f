//! Pattern exemplar rendering.

use std::path::{Path, PathBuf};

use qmotif_graph::CircuitGraph;
use thiserror::Error;

/// Errors raised by a renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The output location could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Draws one exemplar to disk.
pub trait PatternRenderer: Send + Sync {
    /// Render `exemplar` for `target` with a title; returns the file written.
    fn render(&self, exemplar: &CircuitGraph, target: &Path, title: &str) -> RenderResult<PathBuf>;
}

/// Writes a Graphviz document next to the requested image path.
///
/// `rank1_freq40.0pct.png` becomes `rank1_freq40.0pct.dot`; run `dot -Tpng`
/// on it to get the image.
#[derive(Debug, Default, Clone, Copy)]
pub struct DotRenderer;

impl PatternRenderer for DotRenderer {
    fn render(&self, exemplar: &CircuitGraph, target: &Path, title: &str) -> RenderResult<PathBuf> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let path = target.with_extension("dot");
        std::fs::write(&path, exemplar.to_dot(Some(title))).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmotif_graph::{GraphMode, TargetPolicy};
    use qmotif_ir::{Circuit, WireId};

    #[test]
    fn test_dot_renderer_writes_next_to_target() {
        let mut circuit = Circuit::with_wires("bell", 2);
        circuit.h(WireId(0)).unwrap().cx(WireId(0), WireId(1)).unwrap();
        let graph =
            CircuitGraph::build(&circuit, GraphMode::Dataflow, TargetPolicy::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("bell/dataflow/k2/rank1_freq100.0pct.png");
        let written = DotRenderer.render(&graph, &target, "Pattern k=2 Rank 1").unwrap();

        assert_eq!(written, dir.path().join("bell/dataflow/k2/rank1_freq100.0pct.dot"));
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.contains("Pattern k=2 Rank 1"));
        assert!(text.contains("digraph"));
    }

    #[test]
    fn test_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let graph = CircuitGraph::build(
            &Circuit::with_wires("empty", 1),
            GraphMode::Dataflow,
            TargetPolicy::default(),
        )
        .unwrap();
        let err = DotRenderer
            .render(&graph, &blocker.join("sub/out.png"), "t")
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
