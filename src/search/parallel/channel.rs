//! Messages between the orchestrator and its workers, and the status shared
//! between them.

use crate::error::SearchError;
use crate::search::state::SearchState;
use crate::web::node::Node;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A bounded traversal assigned to a worker for one epoch.
#[derive(Debug, Clone)]
pub struct Task {
    pub epoch: u64,
    /// Dispatch position within the epoch; outcomes are evaluated in this order.
    pub slot: usize,
    pub seed: Node,
    pub target: Node,
}

/// What a worker reports once its task has been reconciled.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub epoch: u64,
    pub slot: usize,
    pub worker_id: usize,
    pub state: SearchState,
}

/// Status of a session, readable from any thread.
///
/// The error flag and recorded cause are written by whichever party hits a
/// coordination failure; the orchestrator checks them between epochs.
#[derive(Debug, Default)]
pub struct SessionStatus {
    running: AtomicBool,
    error_flag: AtomicBool,
    cause: Mutex<Option<SearchError>>,
}

impl SessionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `error` as the cause of failure. The latest report wins.
    pub fn flag_error(&self, error: SearchError) {
        tracing::error!(error = %error, "search coordination failure");
        if let Ok(mut cause) = self.cause.lock() {
            *cause = Some(error);
        }
        self.error_flag.store(true, Ordering::SeqCst);
    }

    pub fn error_occurred(&self) -> bool {
        self.error_flag.load(Ordering::SeqCst)
    }

    pub fn cause(&self) -> Option<SearchError> {
        self.cause.lock().ok().and_then(|cause| cause.clone())
    }

    pub fn in_progress(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }
}

/// Channel endpoints held by the orchestrator.
pub struct OrchestratorChannels {
    pub to_workers: Sender<Task>,
    pub from_workers: Receiver<TaskOutcome>,
}

/// Channel endpoints held by each worker.
#[derive(Clone)]
pub struct WorkerChannels {
    pub tasks: Receiver<Task>,
    pub outcomes: Sender<TaskOutcome>,
}

/// Create the task queue shared by all workers and the outcome queue back
/// to the orchestrator.
pub fn create_channels() -> (OrchestratorChannels, WorkerChannels) {
    let (task_tx, task_rx) = unbounded();
    let (outcome_tx, outcome_rx) = unbounded();

    (
        OrchestratorChannels {
            to_workers: task_tx,
            from_workers: outcome_rx,
        },
        WorkerChannels {
            tasks: task_rx,
            outcomes: outcome_tx,
        },
    )
}
