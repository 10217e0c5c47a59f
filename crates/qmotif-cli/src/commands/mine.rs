//! Mine command implementation.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qmotif_graph::{GraphMode, TargetPolicy};
use qmotif_mine::{
    DotRenderer, LabelMode, Miner, MinerConfig, MiningObserver, MiningReport, RunPhase,
};
use qmotif_qasm::QasmSource;
use tracing::debug;

use super::common::print_pattern;

/// Command-line overrides for a mining run.
#[derive(Debug, Clone, Default)]
pub struct MineOptions {
    pub paths: Vec<PathBuf>,
    pub k_min: Option<usize>,
    pub k_max: Option<usize>,
    pub samples: Option<usize>,
    pub exact: bool,
    pub mode: Option<GraphMode>,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub chunk_size: Option<usize>,
    pub top: Option<usize>,
    pub render_top: Option<usize>,
    pub verify_collisions: bool,
    pub target_policy: Option<TargetPolicy>,
    pub label_mode: Option<LabelMode>,
    pub config: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub render: bool,
}

impl MineOptions {
    /// File and environment configuration with these flags on top.
    pub fn resolve(&self) -> Result<MinerConfig> {
        let mut config =
            MinerConfig::load(self.config.as_deref()).context("Failed to load configuration")?;

        if let Some(v) = self.k_min {
            config.k_min = v;
        }
        if let Some(v) = self.k_max {
            config.k_max = v;
        }
        if let Some(v) = self.samples {
            config.samples = v;
        }
        if self.exact {
            config.exact = true;
        }
        if let Some(v) = self.mode {
            config.mode = v;
        }
        if let Some(v) = &self.output {
            config.output_dir.clone_from(v);
        }
        if let Some(v) = self.seed {
            config.seed = Some(v);
        }
        if let Some(v) = self.workers {
            config.workers = Some(v);
        }
        if let Some(v) = self.chunk_size {
            config.chunk_size = v;
        }
        if let Some(v) = self.top {
            config.top_n = v;
            config.render_top = config.render_top.min(v);
        }
        if let Some(v) = self.render_top {
            config.render_top = v;
        }
        if self.verify_collisions {
            config.verify_collisions = true;
        }
        if let Some(v) = self.target_policy {
            config.target_policy = v;
        }
        if let Some(v) = self.label_mode {
            config.label_mode = Some(v);
        }

        Ok(config)
    }
}

/// Execute the mine command.
pub fn execute(options: &MineOptions) -> Result<()> {
    let config = options.resolve()?;
    debug!("Resolved configuration: {config:?}");

    println!(
        "{} Mining {} (mode {}, k={}..{}, {})",
        style("→").cyan().bold(),
        style(describe_inputs(&options.paths)).green(),
        style(config.mode).yellow(),
        config.k_min,
        config.k_max,
        if config.exact {
            "exhaustive".to_string()
        } else {
            format!("{} samples per graph", config.samples)
        }
    );

    let mut miner =
        Miner::new(config, Arc::new(QasmSource::new()))?.with_observer(ProgressObserver::new());
    if options.render {
        miner = miner.with_renderer(DotRenderer);
    }

    let report = miner.run(&options.paths)?;
    print_report(&report);

    if let Some(path) = &options.report {
        let json = report.to_json().context("Failed to serialize report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("  Report: {}", style(path.display()).green());
    }

    Ok(())
}

fn describe_inputs(paths: &[PathBuf]) -> String {
    match paths {
        [single] => single.display().to_string(),
        many => format!("{} inputs", many.len()),
    }
}

fn print_report(report: &MiningReport) {
    println!(
        "{} Built {} {} graphs from '{}' (seed {})",
        style("✓").green().bold(),
        report.graphs_built,
        report.mode,
        report.benchmark,
        report.seed
    );
    for (path, reason) in &report.failed_files {
        println!(
            "  {} {}: {}",
            style("✗").red().bold(),
            path.display(),
            style(reason).dim()
        );
    }

    for level in &report.levels {
        println!(
            "\n{}",
            style(format!(
                "=== k={}: {} subgraphs, {} unique patterns ===",
                level.k, level.total_examined, level.unique_patterns
            ))
            .bold()
        );
        if level.top.is_empty() {
            println!("  {}", style("no patterns found").dim());
        }
        for pattern in &level.top {
            print_pattern(pattern, level.total_examined);
        }
    }
}

/// Progress bar driven by the miner's phase callbacks.
struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {msg:<32} [{bar:30.cyan/blue}] {pos}/{len}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl MiningObserver for ProgressObserver {
    fn phase(&self, phase: RunPhase) {
        if phase == RunPhase::Done {
            self.bar.finish_and_clear();
        } else {
            self.bar.set_message(phase.to_string());
        }
    }

    fn work_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn work_done(&self) {
        self.bar.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_applies_flags_over_defaults() {
        let options = MineOptions {
            paths: vec![PathBuf::from("x")],
            k_max: Some(4),
            exact: true,
            mode: Some(GraphMode::Comm),
            top: Some(2),
            output: Some(PathBuf::from("out")),
            render: true,
            ..MineOptions::default()
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.k_min, 2);
        assert_eq!(config.k_max, 4);
        assert!(config.exact);
        assert_eq!(config.mode, GraphMode::Comm);
        assert_eq!(config.top_n, 2);
        assert_eq!(config.render_top, 2);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.label_mode(), LabelMode::ByEdgeRole);
    }

    #[test]
    fn test_resolve_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qmotif.yaml");
        fs::write(&path, "k_min: 3\nk_max: 3\nsamples: 50\n").unwrap();

        let options = MineOptions {
            config: Some(path),
            samples: Some(75),
            ..MineOptions::default()
        };
        let config = options.resolve().unwrap();
        assert_eq!(config.k_min, 3);
        assert_eq!(config.samples, 75);
    }

    #[test]
    fn test_describe_inputs() {
        assert_eq!(describe_inputs(&[PathBuf::from("qft")]), "qft");
        assert_eq!(
            describe_inputs(&[PathBuf::from("a"), PathBuf::from("b")]),
            "2 inputs"
        );
    }
}
