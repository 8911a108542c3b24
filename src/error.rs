//! Error types for search sessions and link resolution

use thiserror::Error;

/// Configuration problems detected before any search work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A session needs at least one worker.
    #[error("invalid worker count {0}: at least one worker is required")]
    InvalidWorkerCount(usize),
    /// A start or target identity could not be turned into a node.
    #[error("invalid node identity '{identity}': {reason}")]
    InvalidIdentity { identity: String, reason: String },
}

/// Failures that stop a search session.
///
/// Coordination failures are recorded as the session's cause of error and end
/// the epoch loop once the current epoch has drained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search session has already been started")]
    AlreadyStarted,
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
    #[error("failed to acquire a work permit: {0}")]
    PermitAcquisition(String),
    #[error("epoch rendezvous failed: {0}")]
    Rendezvous(String),
    #[error("failed to resolve a worker outcome: {0}")]
    TaskResult(String),
    #[error("worker {worker_id} panicked while crawling from '{seed}'")]
    WorkerPanicked { worker_id: usize, seed: String },
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

/// Transient failures while fetching the neighbors of a node.
///
/// These never surface to the session; a traversal treats them as an empty
/// neighbor list.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request for {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
    #[error("resolver unavailable for {0}")]
    Unavailable(String),
}
