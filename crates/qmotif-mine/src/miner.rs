//! Mining orchestration.
//!
//! A run discovers input files, builds one graph per file on the worker
//! pool, then mines every size in `[k_min, k_max]` independently: tasks are
//! dispatched to the pool, their tables merged on this thread in completion
//! order, and the merged table ranked. Top exemplars are handed to the
//! renderer at the end.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use qmotif_graph::{CircuitGraph, GraphMode, TargetPolicy};
use qmotif_ir::CircuitSource;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::canon::CanonicalLabeler;
use crate::config::MinerConfig;
use crate::error::{MineError, MineResult};
use crate::observer::{MiningObserver, MiningStage, NoopObserver, RunPhase};
use crate::pattern::PatternTable;
use crate::pool::WorkerPool;
use crate::render::PatternRenderer;
use crate::report::{LevelReport, MiningReport, RankedPattern};
use crate::task::{MiningTask, TaskPlan};

/// Benchmark name used when several inputs are given.
pub const MIXED_BENCHMARK: &str = "mixed";

/// Runs the mining pipeline.
pub struct Miner {
    config: MinerConfig,
    source: Arc<dyn CircuitSource>,
    renderer: Option<Box<dyn PatternRenderer>>,
    observer: Box<dyn MiningObserver>,
}

impl Miner {
    /// Create a miner after validating `config`.
    pub fn new(config: MinerConfig, source: Arc<dyn CircuitSource>) -> MineResult<Self> {
        config.validate()?;
        if config.extension != source.extension() {
            debug!(
                "Discovering *.{} files with a source for *.{}",
                config.extension,
                source.extension()
            );
        }
        Ok(Self {
            config,
            source,
            renderer: None,
            observer: Box::new(NoopObserver),
        })
    }

    /// Render top exemplars with `renderer`.
    #[must_use]
    pub fn with_renderer<R: PatternRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Report progress to `observer`.
    #[must_use]
    pub fn with_observer<O: MiningObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Input files under `inputs`, in a stable order.
    ///
    /// Files named explicitly are taken as they are; directories are walked
    /// recursively for the configured extension.
    pub fn discover(&self, inputs: &[PathBuf]) -> MineResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for input in inputs {
            let metadata = std::fs::metadata(input).map_err(|source| MineError::Io {
                path: input.clone(),
                source,
            })?;
            if !metadata.is_dir() {
                files.push(input.clone());
                continue;
            }

            for entry in WalkDir::new(input).follow_links(true).sort_by_file_name() {
                let entry = entry.map_err(|e| MineError::Io {
                    path: e.path().map_or_else(|| input.clone(), Path::to_path_buf),
                    source: e.into(),
                })?;
                if entry.file_type().is_file()
                    && has_extension(entry.path(), &self.config.extension)
                {
                    files.push(entry.into_path());
                }
            }
        }
        Ok(files)
    }

    /// Run the full pipeline over `inputs`.
    pub fn run(&self, inputs: &[PathBuf]) -> MineResult<MiningReport> {
        self.observer.phase(RunPhase::Idle);
        let pool = WorkerPool::new(self.config.workers)?;
        let seed = self.config.seed.unwrap_or_else(rand::random);
        info!("Mining with seed {seed} on {} workers", pool.workers());

        self.observer.phase(RunPhase::Discovering);
        let files = self.discover(inputs)?;
        if files.is_empty() {
            return Err(MineError::NoInputs(inputs.to_vec()));
        }
        let benchmark = benchmark_name(inputs);
        info!("Found {} input files for '{benchmark}'", files.len());

        self.observer.phase(RunPhase::BuildingGraphs);
        let (graphs, failed_files) = self.build_graphs(&pool, &files);
        info!(
            "Built {} {} graphs, {} inputs failed",
            graphs.len(),
            self.config.mode,
            failed_files.len()
        );

        let graphs = Arc::new(graphs);
        let labeler = CanonicalLabeler::new(self.config.label_mode());
        let plan = TaskPlan {
            exact: self.config.exact,
            by_interactions: self.config.mode == GraphMode::Comm,
            samples: self.config.samples,
            chunk_size: self.config.chunk_size,
            seed,
        };

        let mut levels = Vec::with_capacity(self.config.k_max - self.config.k_min + 1);
        for k in self.config.k_min..=self.config.k_max {
            levels.push(self.mine_level(&pool, &graphs, &labeler, &plan, k)?);
        }

        self.observer.phase(RunPhase::Reporting);
        if let Some(renderer) = &self.renderer {
            for level in &mut levels {
                self.render_level(renderer.as_ref(), &benchmark, level);
            }
        }

        self.observer.phase(RunPhase::Done);
        Ok(MiningReport {
            benchmark,
            mode: self.config.mode,
            label_mode: labeler.mode(),
            seed,
            files_found: files.len(),
            graphs_built: graphs.len(),
            failed_files,
            levels,
        })
    }

    /// Load and convert every file; failures are logged and excluded.
    fn build_graphs(
        &self,
        pool: &WorkerPool,
        files: &[PathBuf],
    ) -> (Vec<CircuitGraph>, Vec<(PathBuf, String)>) {
        let source = Arc::clone(&self.source);
        let mode = self.config.mode;
        let policy: TargetPolicy = self.config.target_policy;

        self.observer.work_started(files.len());
        let mut slots: Vec<Option<Result<CircuitGraph, String>>> = vec![None; files.len()];
        for done in pool.run(files.to_vec(), move |path: PathBuf| {
            let circuit = source.load(&path).map_err(|e| e.to_string())?;
            CircuitGraph::build(&circuit, mode, policy).map_err(|e| e.to_string())
        }) {
            slots[done.index] = Some(done.outcome.and_then(|built| built));
            self.observer.work_done();
        }

        let mut graphs = Vec::with_capacity(files.len());
        let mut failed = Vec::new();
        for (path, slot) in files.iter().zip(slots) {
            match slot {
                Some(Ok(graph)) => {
                    debug!(
                        "{}: {} nodes, {} edges",
                        path.display(),
                        graph.node_count(),
                        graph.edge_count()
                    );
                    graphs.push(graph);
                }
                Some(Err(reason)) => {
                    warn!("Skipping {}: {reason}", path.display());
                    failed.push((path.clone(), reason));
                }
                None => {
                    let reason = "worker exited without a result".to_string();
                    warn!("Skipping {}: {reason}", path.display());
                    failed.push((path.clone(), reason));
                }
            }
        }
        (graphs, failed)
    }

    fn mine_level(
        &self,
        pool: &WorkerPool,
        graphs: &Arc<Vec<CircuitGraph>>,
        labeler: &CanonicalLabeler,
        plan: &TaskPlan,
        k: usize,
    ) -> MineResult<LevelReport> {
        let stage = |stage| RunPhase::Mining { k, stage };
        let verify = self.config.verify_collisions;

        self.observer.phase(stage(MiningStage::Dispatching));
        let tasks: Vec<MiningTask> = (0..graphs.len())
            .filter(|&i| graphs[i].node_count() >= k)
            .flat_map(|i| plan.tasks_for(i, k))
            .collect();
        debug!("k={k}: dispatching {} tasks", tasks.len());

        let shared = Arc::clone(graphs);
        let labeler_copy = *labeler;
        let completions = pool.run(tasks.clone(), move |task: MiningTask| {
            task.execute(&shared[task.graph_index], &labeler_copy, verify)
        });

        self.observer.phase(stage(MiningStage::Aggregating));
        self.observer.work_started(tasks.len());
        let mut table = if verify {
            PatternTable::verified(*labeler)
        } else {
            PatternTable::new()
        };
        for done in completions {
            match done.outcome {
                Ok(partial) => table.merge(partial),
                Err(message) => {
                    return Err(MineError::WorkerFailed {
                        task: tasks[done.index].to_string(),
                        message,
                    });
                }
            }
            self.observer.work_done();
        }

        self.observer.phase(stage(MiningStage::Ranking));
        let top: Vec<RankedPattern> = table
            .ranked()
            .into_iter()
            .take(self.config.top_n)
            .enumerate()
            .map(|(i, entry)| RankedPattern {
                rank: i + 1,
                hash: entry.hash,
                variant: entry.variant,
                count: entry.count,
                frequency: table.frequency(entry.count),
                exemplar: entry.exemplar.clone(),
                rendered: None,
            })
            .collect();

        info!(
            "k={k}: {} subgraphs examined, {} unique patterns",
            table.total_examined(),
            table.unique_patterns()
        );
        Ok(LevelReport {
            k,
            total_examined: table.total_examined(),
            unique_patterns: table.unique_patterns(),
            top,
        })
    }

    fn render_level(
        &self,
        renderer: &dyn PatternRenderer,
        benchmark: &str,
        level: &mut LevelReport,
    ) {
        let dir = self
            .config
            .output_dir
            .join(benchmark)
            .join(self.config.mode.as_str())
            .join(format!("k{}", level.k));
        let total = level.total_examined;

        for pattern in level.top.iter_mut().take(self.config.render_top) {
            let pct = pattern.frequency * 100.0;
            let target = dir.join(format!("rank{}_freq{pct:.1}pct.png", pattern.rank));
            let title = format!(
                "Pattern k={} Rank {} | Freq: {pct:.1}% ({}/{total})",
                level.k, pattern.rank, pattern.count
            );
            match renderer.render(&pattern.exemplar, &target, &title) {
                Ok(path) => {
                    debug!("Rendered {}", path.display());
                    pattern.rendered = Some(path);
                }
                Err(e) => warn!("Failed to render k={} rank {}: {e}", level.k, pattern.rank),
            }
        }
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

/// Output directory name for a selection of inputs.
///
/// A single directory gives its basename, a single file its stem, anything
/// else [`MIXED_BENCHMARK`].
pub fn benchmark_name(inputs: &[PathBuf]) -> String {
    let [single] = inputs else {
        return MIXED_BENCHMARK.to_string();
    };
    let name = if single.is_dir() {
        single
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .or_else(|| {
                single
                    .canonicalize()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            })
    } else {
        single.file_stem().map(|n| n.to_string_lossy().into_owned())
    };
    name.unwrap_or_else(|| MIXED_BENCHMARK.to_string())
}
