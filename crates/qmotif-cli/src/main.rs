//! qmotif Command-Line Interface
//!
//! Mines recurring communication patterns from a corpus of quantum circuits.
//!
//! ```text
//! qmotif mine benchmarks/qft --k-min 2 --k-max 4 --mode comm
//! qmotif graph adder.qasm --mode dataflow --export adder.dot
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use qmotif_graph::{GraphMode, TargetPolicy};
use qmotif_mine::LabelMode;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{graph, mine};

/// qmotif - frequent communication patterns in quantum circuits
#[derive(Parser)]
#[command(name = "qmotif")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine frequent subgraphs from circuit files or directories
    Mine {
        /// Input files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Smallest subgraph size
        #[arg(long)]
        k_min: Option<usize>,

        /// Largest subgraph size
        #[arg(long)]
        k_max: Option<usize>,

        /// Samples per graph and size
        #[arg(short, long)]
        samples: Option<usize>,

        /// Enumerate every connected subgraph instead of sampling
        #[arg(long)]
        exact: bool,

        /// Graph representation (dataflow, comm)
        #[arg(short, long)]
        mode: Option<GraphMode>,

        /// Output directory for rendered patterns
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run seed for sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (default: all cores)
        #[arg(short = 'j', long)]
        workers: Option<usize>,

        /// Samples per worker task
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Patterns reported per size
        #[arg(long)]
        top: Option<usize>,

        /// Patterns rendered per size
        #[arg(long)]
        render_top: Option<usize>,

        /// Split hash collisions with an exact isomorphism check
        #[arg(long)]
        verify_collisions: bool,

        /// Interaction target wire (last-wire, first-wire)
        #[arg(long)]
        target_policy: Option<TargetPolicy>,

        /// Labeling strategy (by-operation-name, by-edge-role)
        #[arg(long)]
        label_mode: Option<LabelMode>,

        /// YAML configuration file
        #[arg(short, long, env = "QMOTIF_CONFIG")]
        config: Option<PathBuf>,

        /// Write the full report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Skip writing pattern drawings
        #[arg(long)]
        no_render: bool,
    },

    /// Build the graph of a single circuit and optionally export it
    Graph {
        /// Input circuit file
        file: PathBuf,

        /// Graph representation (dataflow, comm)
        #[arg(short, long, default_value = "dataflow")]
        mode: GraphMode,

        /// Interaction target wire (last-wire, first-wire)
        #[arg(long, default_value = "last-wire")]
        target_policy: TargetPolicy,

        /// Export path (.json node-link or .dot Graphviz)
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Mine {
            paths,
            k_min,
            k_max,
            samples,
            exact,
            mode,
            output,
            seed,
            workers,
            chunk_size,
            top,
            render_top,
            verify_collisions,
            target_policy,
            label_mode,
            config,
            report,
            no_render,
        } => mine::execute(&mine::MineOptions {
            paths,
            k_min,
            k_max,
            samples,
            exact,
            mode,
            output,
            seed,
            workers,
            chunk_size,
            top,
            render_top,
            verify_collisions,
            target_policy,
            label_mode,
            config,
            report,
            render: !no_render,
        }),

        Commands::Graph {
            file,
            mode,
            target_policy,
            export,
        } => graph::execute(&file, mode, target_policy, export.as_deref()),
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
