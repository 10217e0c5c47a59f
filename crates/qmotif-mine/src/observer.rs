//! Run phases and progress callbacks.

use std::fmt;

/// Step within one mining level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningStage {
    /// Tasks are being submitted.
    Dispatching,
    /// Task results are being merged.
    Aggregating,
    /// The merged table is being ranked.
    Ranking,
}

/// Where a run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Discovering,
    BuildingGraphs,
    Mining { k: usize, stage: MiningStage },
    Reporting,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Discovering => write!(f, "discovering inputs"),
            Self::BuildingGraphs => write!(f, "building graphs"),
            Self::Mining { k, stage } => {
                let stage = match stage {
                    MiningStage::Dispatching => "dispatching",
                    MiningStage::Aggregating => "aggregating",
                    MiningStage::Ranking => "ranking",
                };
                write!(f, "mining k={k} ({stage})")
            }
            Self::Reporting => write!(f, "reporting"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Receives progress from a [`crate::Miner`].
///
/// Callbacks run on the orchestrating thread, never on workers.
pub trait MiningObserver: Send + Sync {
    /// The run entered `phase`.
    fn phase(&self, _phase: RunPhase) {}

    /// `total` units of work start for the current phase.
    fn work_started(&self, _total: usize) {}

    /// One unit of work finished.
    fn work_done(&self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MiningObserver for NoopObserver {}
