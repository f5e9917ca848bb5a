use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error, warn};

use crate::core::error::MatchError;
use crate::core::pool::CandidatePool;
use crate::core::types::{MatchResult, Query};
use crate::matching::engine::{CandidateFunnel, MatchingConfig};

/// How a batch of queries is scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Run every query on the calling thread
    #[default]
    Sequential,
    /// Spread queries over a dedicated worker pool; `None` lets rayon pick
    /// the number of threads
    Parallel { workers: Option<usize> },
}

/// Runs many independent queries against one shared candidate pool.
///
/// Results are indexed by query position, never by completion order, so
/// sequential and parallel runs produce identical output.
pub struct BatchMatcher {
    config: MatchingConfig,
    thread_pool: Option<ThreadPool>,
}

impl BatchMatcher {
    /// Create a batch matcher.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` for an invalid matching config or a
    /// zero worker count, and `MatchError::ThreadPool` if the worker threads
    /// cannot be spawned.
    pub fn new(config: MatchingConfig, mode: ExecutionMode) -> Result<Self, MatchError> {
        config.validate()?;

        let thread_pool = match mode {
            ExecutionMode::Sequential => None,
            ExecutionMode::Parallel { workers: Some(0) } => {
                return Err(MatchError::InvalidConfig(
                    "number of workers must be > 0".to_string(),
                ));
            }
            ExecutionMode::Parallel { workers } => {
                let mut builder = ThreadPoolBuilder::new();
                if let Some(n) = workers {
                    builder = builder.num_threads(n);
                }
                Some(builder.build()?)
            }
        };

        Ok(Self {
            config,
            thread_pool,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        match &self.thread_pool {
            None => ExecutionMode::Sequential,
            Some(pool) => ExecutionMode::Parallel {
                workers: Some(pool.current_num_threads()),
            },
        }
    }

    /// Match every query against `pool`, one entry per query in input order.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` if the funnel cannot be built.
    /// Failures while matching a single query never surface here; they turn
    /// into `None` for that query.
    pub fn map(
        &self,
        queries: &[Query],
        pool: &CandidatePool,
    ) -> Result<Vec<Option<MatchResult>>, MatchError> {
        let slots: Vec<Option<&Query>> = queries.iter().map(Some).collect();
        self.run(&slots, pool)
    }

    /// Like [`Self::map`], but accepts slots for queries that could not be
    /// built from their input row. Such slots are logged and yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidConfig` if the funnel cannot be built.
    pub fn map_slots(
        &self,
        queries: &[Option<Query>],
        pool: &CandidatePool,
    ) -> Result<Vec<Option<MatchResult>>, MatchError> {
        let slots: Vec<Option<&Query>> = queries.iter().map(Option::as_ref).collect();
        self.run(&slots, pool)
    }

    fn run(
        &self,
        slots: &[Option<&Query>],
        pool: &CandidatePool,
    ) -> Result<Vec<Option<MatchResult>>, MatchError> {
        let funnel = CandidateFunnel::new(pool, &self.config)?;
        let match_one = |(index, slot): (usize, &Option<&Query>)| match_slot(&funnel, index, *slot);

        debug!(
            queries = slots.len(),
            candidates = pool.len(),
            parallel = self.thread_pool.is_some(),
            "Starting batch"
        );

        let results = match &self.thread_pool {
            Some(workers) => {
                workers.install(|| slots.par_iter().enumerate().map(&match_one).collect())
            }
            None => slots.iter().enumerate().map(&match_one).collect(),
        };

        Ok(results)
    }
}

/// Match one slot, isolating any panic to this query
fn match_slot(funnel: &CandidateFunnel<'_>, index: usize, slot: Option<&Query>) -> Option<MatchResult> {
    let Some(query) = slot else {
        let err = MatchError::MalformedInput(format!("query #{index} has no usable name"));
        warn!(index, "{err}");
        return None;
    };

    match catch_unwind(AssertUnwindSafe(|| funnel.find_matches(query))) {
        Ok(result) => result,
        Err(panic) => {
            let err = MatchError::WorkerFault(panic_message(panic.as_ref()));
            error!(index, query = %query.label(), "{err}");
            None
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
