//! Search session: epoch-synchronized orchestration of spider workers.
//!
//! Each epoch the orchestrator takes up to `num_workers` seeds from the
//! frontier and hands one to each worker. A worker runs a bounded traversal,
//! then reconciles it with the epoch:
//!
//! - a collision returns its permit and leaves the rendezvous at once;
//! - any other outcome waits at the rendezvous with its peers and the
//!   orchestrator;
//! - every outcome except a found result puts its path back on the frontier.
//!
//! Once the rendezvous trips the orchestrator collects every outcome, takes
//! the first found result in dispatch order as the solution, and refills the
//! admission gate for the next epoch.

use crate::error::SearchError;
use crate::search::controller::Controller;
use crate::search::parallel::channel::{
    OrchestratorChannels, SessionStatus, Task, TaskOutcome, WorkerChannels, create_channels,
};
use crate::search::parallel::config::SessionConfig;
use crate::search::parallel::sync::{AdmissionGate, EpochBarrier};
use crate::search::result::{SearchReport, SearchStatistics};
use crate::search::spider::Spider;
use crate::search::state::{SearchState, Status};
use crate::web::node::Node;
use crate::web::resolver::{LinkFilter, NeighborResolver, adjacent_nodes};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, info, warn};

/// State shared between the orchestrator and its workers.
struct Shared<R, F> {
    config: SessionConfig,
    resolver: Arc<R>,
    filter: Arc<F>,
    controller: Controller,
    frontier: Mutex<VecDeque<Node>>,
    gate: AdmissionGate,
    barrier: EpochBarrier,
    status: Arc<SessionStatus>,
    cancelled: AtomicBool,
}

impl<R, F> Shared<R, F> {
    fn frontier(&self) -> Result<MutexGuard<'_, VecDeque<Node>>, SearchError> {
        self.frontier
            .lock()
            .map_err(|_| SearchError::LockPoisoned("frontier"))
    }
}

/// A single search from one start node to one target node.
///
/// A session runs at most once; the outcome is read back through the
/// accessors after [`SearchSession::search`] returns.
pub struct SearchSession<R, F> {
    shared: Arc<Shared<R, F>>,
    endpoints: Option<(Node, Node)>,
    solution: Vec<Node>,
    statistics: SearchStatistics,
}

impl<R, F> SearchSession<R, F>
where
    R: NeighborResolver + 'static,
    F: LinkFilter + 'static,
{
    pub fn new(config: SessionConfig, resolver: Arc<R>, filter: Arc<F>) -> Result<Self, SearchError> {
        config.validate()?;
        let num_workers = config.num_workers;

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                resolver,
                filter,
                controller: Controller::new(),
                frontier: Mutex::new(VecDeque::new()),
                gate: AdmissionGate::new(num_workers),
                barrier: EpochBarrier::new(),
                status: Arc::new(SessionStatus::new()),
                cancelled: AtomicBool::new(false),
            }),
            endpoints: None,
            solution: Vec::new(),
            statistics: SearchStatistics::default(),
        })
    }

    /// Search for a path from `start` to `target`.
    ///
    /// Returns an error only when the session was already used. Failures
    /// during the search are recorded and read back with
    /// [`SearchSession::cause_of_error`].
    pub fn search(&mut self, start: Node, target: Node) -> Result<(), SearchError> {
        if self.endpoints.is_some() {
            return Err(SearchError::AlreadyStarted);
        }
        self.endpoints = Some((start.clone(), target.clone()));

        let started_at = Instant::now();
        self.shared.status.set_running(true);
        info!(
            start = %start,
            target = %target,
            workers = self.shared.config.num_workers,
            "starting search"
        );

        self.seed_frontier(&start, &target);

        let (channels, worker_channels) = create_channels();
        let workers = self.spawn_workers(worker_channels);

        let mut epoch = 0;
        while self.should_continue_search() {
            epoch += 1;
            self.run_epoch(epoch, &target, &channels);
        }

        self.shutdown(channels, workers);

        self.statistics.nodes_visited = self.shared.controller.len();
        self.statistics.frontier_remaining = self.shared.frontier().map(|f| f.len()).unwrap_or(0);
        self.statistics.elapsed_time = started_at.elapsed();
        self.shared.status.set_running(false);

        info!(
            found = self.solution_found(),
            error = self.search_error_occurred(),
            epochs = self.statistics.epochs,
            nodes_visited = self.statistics.nodes_visited,
            "search finished"
        );
        Ok(())
    }

    /// The path from start to target, empty if none was found.
    pub fn solution(&self) -> &[Node] {
        &self.solution
    }

    pub fn solution_found(&self) -> bool {
        !self.solution.is_empty()
    }

    pub fn search_error_occurred(&self) -> bool {
        self.shared.status.error_occurred()
    }

    pub fn cause_of_error(&self) -> Option<SearchError> {
        self.shared.status.cause()
    }

    pub fn in_progress(&self) -> bool {
        self.shared.status.in_progress()
    }

    /// Status handle that stays readable from other threads while the
    /// search runs.
    pub fn status(&self) -> Arc<SessionStatus> {
        Arc::clone(&self.shared.status)
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Summary of a finished search, `None` before `search` was called.
    pub fn report(&self) -> Option<SearchReport> {
        self.endpoints
            .as_ref()
            .map(|(start, target)| self.report_for(start.clone(), target.clone()))
    }

    /// Run the search and hand back its report.
    pub fn run(mut self, start: Node, target: Node) -> Result<SearchReport, SearchError> {
        self.search(start.clone(), target.clone())?;
        Ok(self.report_for(start, target))
    }

    fn report_for(&self, start: Node, target: Node) -> SearchReport {
        SearchReport {
            start,
            target,
            solution: self.solution.clone(),
            error: self.cause_of_error(),
            statistics: self.statistics.clone(),
        }
    }

    fn should_continue_search(&self) -> bool {
        if self.solution_found() || self.search_error_occurred() {
            return false;
        }
        match self.shared.frontier() {
            Ok(frontier) => !frontier.is_empty(),
            Err(err) => {
                self.shared.status.flag_error(err);
                false
            }
        }
    }

    fn seed_frontier(&self, start: &Node, target: &Node) {
        // Seeding with the start itself lets the first traversal report it.
        let seeds = if start == target {
            vec![start.clone()]
        } else {
            adjacent_nodes(&*self.shared.resolver, &*self.shared.filter, start)
        };
        debug!(seeds = seeds.len(), "seeding frontier");

        match self.shared.frontier() {
            Ok(mut frontier) => frontier.extend(seeds),
            Err(err) => self.shared.status.flag_error(err),
        }
    }

    fn spawn_workers(&self, channels: WorkerChannels) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.shared.config.num_workers);
        for worker_id in 0..self.shared.config.num_workers {
            let shared = Arc::clone(&self.shared);
            let channels = channels.clone();
            let spawned = thread::Builder::new()
                .name(format!("spider-{worker_id}"))
                .spawn(move || run_worker(worker_id, &shared, channels));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    // A short pool would deadlock the rendezvous; stop before
                    // the first epoch instead.
                    self.shared.status.flag_error(SearchError::TaskResult(format!(
                        "failed to spawn worker {worker_id}: {err}"
                    )));
                    break;
                }
            }
        }
        handles
    }

    fn take_seeds(&self) -> Vec<Node> {
        match self.shared.frontier() {
            Ok(mut frontier) => {
                let count = frontier.len().min(self.shared.config.num_workers);
                frontier.drain(..count).collect()
            }
            Err(err) => {
                self.shared.status.flag_error(err);
                Vec::new()
            }
        }
    }

    fn run_epoch(&mut self, epoch: u64, target: &Node, channels: &OrchestratorChannels) {
        // Worker slots without a seed sit this epoch out.
        let seeds = self.take_seeds();
        if seeds.is_empty() {
            return;
        }
        self.statistics.epochs += 1;

        if let Err(err) = self.shared.barrier.reset(seeds.len() + 1) {
            self.shared.status.flag_error(err);
            return;
        }

        let mut dispatched = 0;
        for (slot, seed) in seeds.into_iter().enumerate() {
            let task = Task {
                epoch,
                slot,
                seed,
                target: target.clone(),
            };
            if channels.to_workers.send(task).is_ok() {
                dispatched += 1;
            } else {
                self.shared.status.flag_error(SearchError::TaskResult(
                    "worker pool disconnected".to_string(),
                ));
                if let Err(err) = self.shared.barrier.arrive_and_deregister() {
                    self.shared.status.flag_error(err);
                }
            }
        }
        self.statistics.traversals_dispatched += dispatched as u64;
        debug!(epoch, dispatched, "epoch dispatched");

        if let Err(err) = self.shared.barrier.arrive_and_wait() {
            self.shared.status.flag_error(err);
        }

        let outcomes = self.collect_outcomes(epoch, dispatched, channels);
        for outcome in &outcomes {
            self.statistics.record(outcome.state.status);
        }

        let found = outcomes
            .iter()
            .filter(|outcome| outcome.state.status == Status::FoundResult)
            .find_map(|outcome| outcome.state.terminal_node());
        if let Some(terminal) = found {
            self.solution = terminal.path_from_root();
            info!(epoch, hops = self.solution.len().saturating_sub(1), "solution found");
        }

        if let Err(err) = self.shared.gate.replenish() {
            self.shared.status.flag_error(err);
        }
    }

    /// Wait for the outcome of every dispatched task, ordered by slot.
    fn collect_outcomes(
        &self,
        epoch: u64,
        dispatched: usize,
        channels: &OrchestratorChannels,
    ) -> Vec<TaskOutcome> {
        let mut outcomes = Vec::with_capacity(dispatched);
        while outcomes.len() < dispatched {
            match channels.from_workers.recv() {
                Ok(outcome) if outcome.epoch == epoch => {
                    debug!(
                        epoch,
                        worker = outcome.worker_id,
                        status = %outcome.state.status,
                        "worker outcome"
                    );
                    outcomes.push(outcome);
                }
                Ok(stale) => {
                    warn!(epoch, stale_epoch = stale.epoch, "discarding outcome from another epoch");
                }
                Err(err) => {
                    self.shared
                        .status
                        .flag_error(SearchError::TaskResult(err.to_string()));
                    break;
                }
            }
        }
        outcomes.sort_by_key(|outcome| outcome.slot);
        outcomes
    }

    fn shutdown(&self, channels: OrchestratorChannels, workers: Vec<JoinHandle<()>>) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
        self.shared.gate.close();
        self.shared.barrier.break_barrier();
        drop(channels);

        for handle in workers {
            if handle.join().is_err() {
                warn!("worker thread panicked during shutdown");
            }
        }
    }
}

/// Worker loop: run each task to a terminal state, then reconcile it.
fn run_worker<R, F>(worker_id: usize, shared: &Shared<R, F>, channels: WorkerChannels)
where
    R: NeighborResolver,
    F: LinkFilter,
{
    for task in channels.tasks.iter() {
        let state = traverse(worker_id, shared, &task);
        reconcile(shared, &state);

        let outcome = TaskOutcome {
            epoch: task.epoch,
            slot: task.slot,
            worker_id,
            state,
        };
        if channels.outcomes.send(outcome).is_err() {
            break;
        }
    }
}

fn traverse<R, F>(worker_id: usize, shared: &Shared<R, F>, task: &Task) -> SearchState
where
    R: NeighborResolver,
    F: LinkFilter,
{
    if let Err(err) = shared.gate.acquire() {
        shared.status.flag_error(err);
        return SearchState::error();
    }

    let crawled = panic::catch_unwind(AssertUnwindSafe(|| {
        Spider::new(&shared.controller, &*shared.resolver, &*shared.filter)
            .with_visit_budget(shared.config.visit_budget())
            .with_grace_period(shared.config.connection_grace_period)
            .with_cancellation(&shared.cancelled)
            .crawl(task.seed.clone(), &task.target)
    }));

    crawled.unwrap_or_else(|_| {
        shared.status.flag_error(SearchError::WorkerPanicked {
            worker_id,
            seed: task.seed.identity().to_string(),
        });
        SearchState::error()
    })
}

fn reconcile<R, F>(shared: &Shared<R, F>, state: &SearchState) {
    let synced = if state.status == Status::Collision {
        shared
            .gate
            .release()
            .and_then(|()| shared.barrier.arrive_and_deregister())
    } else {
        shared.barrier.arrive_and_wait()
    };
    if let Err(err) = synced {
        shared.status.flag_error(err);
    }

    if state.status != Status::FoundResult && !state.path.is_empty() {
        match shared.frontier() {
            Ok(mut frontier) => frontier.extend(state.path.iter().cloned()),
            Err(err) => shared.status.flag_error(err),
        }
    }
}

/// Run a session to completion and return its report.
pub fn run_search<R, F>(
    start: Node,
    target: Node,
    config: SessionConfig,
    resolver: Arc<R>,
    filter: Arc<F>,
) -> Result<SearchReport, SearchError>
where
    R: NeighborResolver + 'static,
    F: LinkFilter + 'static,
{
    SearchSession::new(config, resolver, filter)?.run(start, target)
}
