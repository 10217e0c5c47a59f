//! Units of mining work dispatched to the pool.

use std::fmt;

use qmotif_graph::CircuitGraph;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::canon::{CanonicalLabeler, hash_with_domain};
use crate::enumerate::connected_subsets;
use crate::pattern::PatternTable;
use crate::sample::{sample_by_interactions, sample_by_nodes};

/// How a task selects subgraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Every connected `k`-node set.
    Exhaustive,
    /// Random `k`-node sets.
    NodeSampling {
        /// Samples in this chunk.
        samples: usize,
    },
    /// Random sets holding exactly `k` interaction edges.
    InteractionSampling {
        /// Samples in this chunk.
        samples: usize,
    },
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhaustive => write!(f, "exhaustive"),
            Self::NodeSampling { samples } => write!(f, "{samples} node samples"),
            Self::InteractionSampling { samples } => write!(f, "{samples} interaction samples"),
        }
    }
}

/// One graph, one `k`, one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningTask {
    /// Index of the graph in the run's graph list.
    pub graph_index: usize,
    /// Target size.
    pub k: usize,
    /// Chunk number within this graph and `k`.
    pub chunk: usize,
    /// Selection strategy.
    pub strategy: Strategy,
    /// RNG seed for sampling strategies.
    pub seed: u64,
}

impl fmt::Display for MiningTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "graph {} k={} chunk {} ({})",
            self.graph_index, self.k, self.chunk, self.strategy
        )
    }
}

/// Seed for one task, derived from the run seed and the task coordinates.
pub fn derive_seed(run_seed: u64, graph_index: usize, k: usize, chunk: usize) -> u64 {
    let mut data = Vec::with_capacity(32);
    data.extend_from_slice(&run_seed.to_le_bytes());
    data.extend_from_slice(&(graph_index as u64).to_le_bytes());
    data.extend_from_slice(&(k as u64).to_le_bytes());
    data.extend_from_slice(&(chunk as u64).to_le_bytes());
    let digest = hash_with_domain(b"TASK_SEED", &data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Parameters shared by every task of a level.
#[derive(Debug, Clone, Copy)]
pub struct TaskPlan {
    /// Use exhaustive enumeration.
    pub exact: bool,
    /// Sample by interaction-edge count instead of node count.
    pub by_interactions: bool,
    /// Samples per graph.
    pub samples: usize,
    /// Samples per task.
    pub chunk_size: usize,
    /// Run seed.
    pub seed: u64,
}

impl TaskPlan {
    /// Tasks for one graph at size `k`.
    ///
    /// Exhaustive runs get one task per graph; sampling runs are split into
    /// chunks of at most `chunk_size` samples.
    pub fn tasks_for(&self, graph_index: usize, k: usize) -> Vec<MiningTask> {
        if self.exact {
            return vec![MiningTask {
                graph_index,
                k,
                chunk: 0,
                strategy: Strategy::Exhaustive,
                seed: 0,
            }];
        }

        let chunk_size = self.chunk_size.max(1);
        (0..self.samples.div_ceil(chunk_size))
            .map(|chunk| {
                let samples = chunk_size.min(self.samples - chunk * chunk_size);
                let strategy = if self.by_interactions {
                    Strategy::InteractionSampling { samples }
                } else {
                    Strategy::NodeSampling { samples }
                };
                MiningTask {
                    graph_index,
                    k,
                    chunk,
                    strategy,
                    seed: derive_seed(self.seed, graph_index, k, chunk),
                }
            })
            .collect()
    }
}

impl MiningTask {
    /// Select, label and count subgraphs of `graph`.
    ///
    /// A graph with fewer than `k` nodes contributes nothing.
    pub fn execute(
        &self,
        graph: &CircuitGraph,
        labeler: &CanonicalLabeler,
        verify: bool,
    ) -> PatternTable {
        let mut table = if verify {
            PatternTable::verified(*labeler)
        } else {
            PatternTable::new()
        };
        if graph.node_count() < self.k {
            return table;
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let sets: Vec<_> = match (self.strategy, graph) {
            (Strategy::Exhaustive, CircuitGraph::Dataflow(g)) => {
                connected_subsets(g, self.k).into_iter().collect()
            }
            (Strategy::Exhaustive, CircuitGraph::Interaction(g)) => {
                connected_subsets(g, self.k).into_iter().collect()
            }
            (Strategy::NodeSampling { samples }, CircuitGraph::Dataflow(g)) => {
                sample_by_nodes(g, self.k, samples, &mut rng)
            }
            (Strategy::NodeSampling { samples }, CircuitGraph::Interaction(g)) => {
                sample_by_nodes(g, self.k, samples, &mut rng)
            }
            (Strategy::InteractionSampling { samples }, CircuitGraph::Dataflow(g)) => {
                sample_by_interactions(g, self.k, samples, &mut rng)
            }
            (Strategy::InteractionSampling { samples }, CircuitGraph::Interaction(g)) => {
                sample_by_interactions(g, self.k, samples, &mut rng)
            }
        };

        for set in &sets {
            let subgraph = graph.induced_subgraph(set);
            table.record(labeler.label_graph(&subgraph), subgraph);
        }

        debug!(
            "{self}: {} subgraphs, {} patterns",
            table.total_examined(),
            table.unique_patterns()
        );
        table
    }
}
