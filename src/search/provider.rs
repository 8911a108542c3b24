//! Runs a search session on a background thread.

use crate::error::SearchError;
use crate::search::parallel::{SearchSession, SessionConfig, SessionStatus};
use crate::search::result::SearchReport;
use crate::web::node::Node;
use crate::web::resolver::{LinkFilter, NeighborResolver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::warn;

/// Handle to a search running on its own thread.
pub struct SearchHandle {
    status: Arc<SessionStatus>,
    thread: JoinHandle<Result<SearchReport, SearchError>>,
}

impl SearchHandle {
    pub fn in_progress(&self) -> bool {
        self.status.in_progress() || !self.thread.is_finished()
    }

    pub fn status(&self) -> Arc<SessionStatus> {
        Arc::clone(&self.status)
    }

    /// Wait for the full report.
    pub fn join_report(self) -> Result<SearchReport, SearchError> {
        self.thread
            .join()
            .unwrap_or_else(|_| Err(SearchError::TaskResult("search thread panicked".to_string())))
    }

    /// Wait for the search and return its solution, empty when no path was
    /// found or the search failed.
    pub fn join(self) -> Vec<Node> {
        match self.join_report() {
            Ok(report) => {
                if let Some(error) = report.error {
                    warn!(error = %error, "search ended with an error");
                }
                report.solution
            }
            Err(error) => {
                warn!(error = %error, "search failed");
                Vec::new()
            }
        }
    }
}

/// Start a search from `start` to `target` without blocking the caller.
///
/// Configuration errors are reported here rather than from the thread.
pub fn spawn_search<R, F>(
    start: Node,
    target: Node,
    config: SessionConfig,
    resolver: Arc<R>,
    filter: Arc<F>,
) -> Result<SearchHandle, SearchError>
where
    R: NeighborResolver + 'static,
    F: LinkFilter + 'static,
{
    let session = SearchSession::new(config, resolver, filter)?;
    let status = session.status();

    let thread = thread::Builder::new()
        .name("search-session".to_string())
        .spawn(move || session.run(start, target))
        .map_err(|err| SearchError::TaskResult(format!("failed to spawn search thread: {err}")))?;

    Ok(SearchHandle { status, thread })
}
