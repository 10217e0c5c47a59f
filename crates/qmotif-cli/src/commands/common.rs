//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use qmotif_ir::{Circuit, CircuitSource};
use qmotif_mine::RankedPattern;
use qmotif_qasm::QasmSource;

/// Load and flatten a circuit file.
pub fn load_circuit(path: &Path) -> Result<Circuit> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    QasmSource::new()
        .load(path)
        .with_context(|| format!("Failed to load circuit from {}", path.display()))
}

/// Frequency as a percentage with two decimals.
pub fn format_frequency(frequency: f64) -> String {
    format!("{:.2}%", frequency * 100.0)
}

/// Print one ranked pattern.
pub fn print_pattern(pattern: &RankedPattern, total: u64) {
    println!(
        "  {} Pattern {}... Freq: {} ({}/{})",
        style(format!("#{}", pattern.rank)).bold(),
        style(pattern.hash.short()).cyan(),
        style(format_frequency(pattern.frequency)).green(),
        pattern.count,
        total
    );
    if pattern.variant > 0 {
        println!("      Variant: {}", pattern.variant);
    }
    println!("      Nodes: [{}]", pattern.node_labels().join(", "));
    println!("      Edges: {}", pattern.edge_count());
    if let Some(path) = &pattern.rendered {
        println!("      Drawing: {}", style(path.display()).dim());
    }
}
