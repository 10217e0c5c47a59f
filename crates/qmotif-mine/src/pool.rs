//! Fixed-size worker pool with a typed completion channel.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;
use tracing::debug;

/// Errors raised while creating the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The thread pool could not be built.
    #[error("Failed to build worker pool: {0}")]
    Build(String),
}

/// Result of one task, tagged with its submission index.
#[derive(Debug)]
pub struct TaskOutcome<R> {
    /// Position of the task in the submitted batch.
    pub index: usize,
    /// The task's return value, or the panic message if it panicked.
    pub outcome: Result<R, String>,
}

/// Worker pool. Tasks run on a dedicated rayon pool; results come back over
/// an mpsc channel in completion order.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Pool with `workers` threads, or one per core when `None`.
    pub fn new(workers: Option<usize>) -> Result<Self, PoolError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("qmotif-worker-{i}"));
        if let Some(n) = workers {
            builder = builder.num_threads(n);
        }
        let pool = builder.build().map_err(|e| PoolError::Build(e.to_string()))?;
        debug!("Worker pool ready with {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Submit every task and return an iterator over their outcomes.
    ///
    /// A panicking task yields an `Err` outcome instead of tearing down the
    /// pool.
    pub fn run<T, R, F>(&self, tasks: Vec<T>, f: F) -> Completions<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let f = Arc::new(f);
        let remaining = tasks.len();

        for (index, task) in tasks.into_iter().enumerate() {
            let tx = tx.clone();
            let f = Arc::clone(&f);
            self.pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(task)))
                    .map_err(|payload| panic_message(payload.as_ref()));
                // The receiver may be gone if the caller stopped early.
                let _ = tx.send(TaskOutcome { index, outcome });
            });
        }

        Completions { rx, remaining }
    }
}

/// Outcomes in completion order.
pub struct Completions<R> {
    rx: Receiver<TaskOutcome<R>>,
    remaining: usize,
}

impl<R> Iterator for Completions<R> {
    type Item = TaskOutcome<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let outcome = self.rx.recv().ok()?;
        self.remaining -= 1;
        Some(outcome)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
