//! Parallel dispatch of evaluations over a scoped worker pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::display::DisplayProvider;
use crate::error::{EvaluationError, RunError};
use crate::model::ParameterSet;

/// Progress of a running dispatch, shareable with another thread.
#[derive(Debug, Clone, Default)]
pub struct RunProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl RunProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
        }
    }

    /// Number of finished evaluations
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Number of evaluations in the current dispatch
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Completed fraction in `[0, 1]`. An empty dispatch counts as done.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            1.0
        } else {
            self.completed() as f64 / total as f64
        }
    }
}

/// Runs one evaluation per parameter set on a fixed-size pool.
pub struct Dispatcher<'a> {
    workers: usize,
    display: &'a dyn DisplayProvider,
}

impl<'a> Dispatcher<'a> {
    pub fn new(workers: usize, display: &'a dyn DisplayProvider) -> Self {
        Self { workers, display }
    }

    /// Evaluate every parameter set and return the results in input order.
    ///
    /// When `suppress_graphics` is set a display session is held for the
    /// whole dispatch and released before returning, whether or not the
    /// evaluations succeed. The first failing evaluation aborts the batch.
    pub fn dispatch<T, F>(
        &self,
        parameter_sets: &[ParameterSet],
        suppress_graphics: bool,
        progress: &RunProgress,
        evaluate: F,
    ) -> Result<Vec<T>, RunError>
    where
        T: Send,
        F: Fn(&ParameterSet) -> Result<T, EvaluationError> + Sync,
    {
        let _display = if suppress_graphics {
            let guard = self.display.acquire()?;
            tracing::info!(display = guard.name(), "Suppressing graphics");
            Some(guard)
        } else {
            None
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("perturb-worker-{i}"))
            .build()
            .map_err(|e| RunError::Config(format!("failed to start worker pool: {e}")))?;

        progress.reset(parameter_sets.len());
        tracing::info!(
            evaluations = parameter_sets.len(),
            workers = self.workers,
            "Running model"
        );

        let results = pool.install(|| {
            parameter_sets
                .par_iter()
                .enumerate()
                .map(|(index, parameters)| {
                    let result =
                        evaluate(parameters).map_err(|source| RunError::Evaluation { index, source });
                    progress.increment();
                    tracing::debug!(index, ok = result.is_ok(), "Evaluation finished");
                    result
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        tracing::info!(evaluations = results.len(), "Finished running model");
        Ok(results)
    }
}
