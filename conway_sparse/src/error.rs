use std::time::Duration;

use thiserror::Error;

/// Rejected simulation settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tick interval must be at least 1 ms")]
    ZeroInterval,

    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("unknown overload policy `{0}` (expected abort, skip or tolerate)")]
    UnknownPolicy(String),
}

/// Errors that end or interrupt the tick loop.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("tick {tick} overran its {budget:?} budget ({elapsed:?} elapsed)")]
    Overload {
        tick: u64,
        elapsed: Duration,
        budget: Duration,
    },

    #[error("worker task failed: {0}")]
    WorkerFailed(String),

    #[error("scheduler is no longer running")]
    Stopped,
}
