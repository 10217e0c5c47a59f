//! Graph command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use qmotif_graph::{CircuitGraph, EdgeRole, GraphMode, TargetPolicy};

use super::common::load_circuit;

/// Execute the graph command.
pub fn execute(
    file: &Path,
    mode: GraphMode,
    policy: TargetPolicy,
    export: Option<&Path>,
) -> Result<()> {
    println!(
        "{} Building {} graph for {}",
        style("→").cyan().bold(),
        style(mode).yellow(),
        style(file.display()).green()
    );

    let circuit = load_circuit(file)?;
    println!(
        "  Loaded: {} wires, {} operations",
        circuit.num_wires(),
        circuit.num_operations()
    );

    let graph = CircuitGraph::build(&circuit, mode, policy)
        .with_context(|| format!("Failed to build graph for {}", file.display()))?;
    println!("{} {}", style("✓").green().bold(), summarize(&graph));

    if let Some(path) = export {
        graph
            .write_to(path)
            .with_context(|| format!("Failed to export graph to {}", path.display()))?;
        println!("  Output: {}", style(path.display()).green());
    }

    Ok(())
}

fn summarize(graph: &CircuitGraph) -> String {
    match graph {
        CircuitGraph::Dataflow(g) => {
            let depth = g.nodes().map(|(_, n)| n.layer).max().unwrap_or(0);
            format!(
                "{} nodes, {} edges, depth {depth}",
                g.node_count(),
                g.edge_count()
            )
        }
        CircuitGraph::Interaction(g) => {
            let interactions = g.edges().filter(|(_, _, e)| e.is_interaction()).count();
            format!(
                "{} nodes, {} edges ({interactions} interaction, {} flow)",
                g.node_count(),
                g.edge_count(),
                g.edge_count() - interactions
            )
        }
    }
}
