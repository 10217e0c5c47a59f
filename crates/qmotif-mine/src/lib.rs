//! Frequent subgraph mining for qmotif
//!
//! This crate finds small connected subgraphs that recur across a corpus of
//! circuit graphs.
//!
//! # Architecture
//!
//! ```text
//! input paths
//!       |
//!       v
//! Miner::discover ---> CircuitSource::load ---> CircuitGraph::build
//!                         (worker pool, per-file failures excluded)
//!       |
//!       v  for each k in [k_min, k_max]
//! TaskPlan -> MiningTask (enumerate | sample by nodes | sample by interactions)
//!       |        |
//!       |        +-- induced subgraph -> CanonicalLabeler -> PatternTable
//!       v
//! merge -> rank -> LevelReport -> PatternRenderer
//! ```
//!
//! # Labeling
//!
//! | Label mode          | Node label       | Collapsed edge attribute   |
//! |---------------------|------------------|----------------------------|
//! | `by-operation-name` | operation name   | number of parallel edges   |
//! | `by-edge-role`      | `node`           | sorted `{kind}_{label}` tags |
//!
//! Hashes come from a direction-aware Weisfeiler-Lehman refinement, so two
//! subgraphs in the same bucket are very likely, but not provably,
//! isomorphic. Enable `verify_collisions` to split buckets with an exact
//! check.
//!
//! # Example
//!
//! ```rust
//! use qmotif_graph::{CircuitGraph, GraphMode, TargetPolicy};
//! use qmotif_ir::{Circuit, WireId};
//! use qmotif_mine::{CanonicalLabeler, LabelMode, PatternTable, connected_subsets};
//!
//! let mut circuit = Circuit::with_wires("ghz", 3);
//! circuit.h(WireId(0)).unwrap();
//! circuit.cx(WireId(0), WireId(1)).unwrap();
//! circuit.cx(WireId(1), WireId(2)).unwrap();
//! let graph = CircuitGraph::build(&circuit, GraphMode::Dataflow, TargetPolicy::default()).unwrap();
//!
//! let labeler = CanonicalLabeler::new(LabelMode::ByOperationName);
//! let mut table = PatternTable::new();
//! if let CircuitGraph::Dataflow(g) = &graph {
//!     for set in connected_subsets(g, 2) {
//!         let sub = graph.induced_subgraph(&set);
//!         table.record(labeler.label_graph(&sub), sub);
//!     }
//! }
//! assert_eq!(table.total_examined(), 2);
//! assert_eq!(table.unique_patterns(), 2);
//! ```

pub mod canon;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod miner;
pub mod observer;
pub mod pattern;
pub mod pool;
pub mod render;
pub mod report;
pub mod sample;
pub mod task;

pub use canon::{CanonicalHash, CanonicalLabeler, CollapsedGraph, LabelMode};
pub use config::{ConfigError, MinerConfig};
pub use enumerate::connected_subsets;
pub use error::{MineError, MineResult};
pub use miner::{Miner, benchmark_name};
pub use observer::{MiningObserver, MiningStage, NoopObserver, RunPhase};
pub use pattern::{PatternEntry, PatternTable};
pub use pool::{PoolError, WorkerPool};
pub use render::{DotRenderer, PatternRenderer, RenderError, RenderResult};
pub use report::{LevelReport, MiningReport, RankedPattern};
pub use sample::{sample_by_interactions, sample_by_nodes};
pub use task::{MiningTask, Strategy, TaskPlan};
