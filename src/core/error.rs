use thiserror::Error;

/// Errors raised by the matching engine
#[derive(Error, Debug)]
pub enum MatchError {
    /// Threshold, multiplier, result limit or worker count out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A query or candidate record is missing a required field
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A single matching task failed unexpectedly
    #[error("Worker fault: {0}")]
    WorkerFault(String),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
