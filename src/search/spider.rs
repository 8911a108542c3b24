//! Bounded breadth-first traversal
//!
//! One traversal starts from a single seed and explores outward until it
//! reaches a terminal [`Status`]. The algorithm in [`crawl`] is fixed; what a
//! page's neighbors are, how a node is judged and which nodes are still worth
//! expanding comes from a [`Crawler`] implementation. [`Spider`] is the
//! crawler used by search sessions.

use crate::search::controller::Controller;
use crate::search::state::{SearchState, Status};
use crate::web::node::Node;
use crate::web::resolver::{LinkFilter, NeighborResolver, adjacent_nodes};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Capabilities a traversal needs from its crawler.
pub trait Crawler {
    /// Whether `node` may still be expanded by this traversal.
    fn is_valid(&self, node: &Node) -> bool;

    /// Judge the last node of `path` against the target.
    fn evaluate(&self, path: &[Node], target: &Node) -> Status;

    /// Expand `node`, returning the neighbors to enqueue.
    fn visit(&mut self, node: &Node) -> Vec<Node>;

    /// Checked once per dequeued path.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Breadth-first search from `seed` toward `target`.
///
/// Exactly one terminal state is returned: the first non-`Working` status
/// reached, `PathsExhausted` when the queue empties, or `Error` if the
/// crawler is cancelled part way.
pub fn crawl<C: Crawler + ?Sized>(crawler: &mut C, seed: Node, target: &Node) -> SearchState {
    let mut to_visit: VecDeque<Vec<Node>> = VecDeque::new();
    to_visit.push_back(vec![seed]);

    while let Some(mut path) = to_visit.pop_front() {
        if crawler.is_cancelled() {
            return SearchState::error();
        }

        // Drop trailing nodes this traversal has already expanded.
        while path.last().is_some_and(|node| !crawler.is_valid(node)) {
            path.pop();
        }
        let Some(current) = path.last().cloned() else {
            continue;
        };

        let status = crawler.evaluate(&path, target);
        if status.is_terminal() {
            return SearchState::new(path, status);
        }

        for neighbor in crawler.visit(&current) {
            let mut next = Vec::with_capacity(path.len() + 1);
            next.extend(path.iter().cloned());
            next.push(neighbor);
            to_visit.push_back(next);
        }
    }

    SearchState::exhausted()
}

/// Crawler that fetches neighbors through a resolver and coordinates with
/// other workers through a shared [`Controller`].
pub struct Spider<'a, R: ?Sized, F: ?Sized> {
    controller: &'a Controller,
    resolver: &'a R,
    filter: &'a F,
    visit_budget: Option<usize>,
    grace_period: Duration,
    cancelled: Option<&'a AtomicBool>,
    visited: HashSet<Node>,
}

impl<'a, R, F> Spider<'a, R, F>
where
    R: NeighborResolver + ?Sized,
    F: LinkFilter + ?Sized,
{
    pub fn new(controller: &'a Controller, resolver: &'a R, filter: &'a F) -> Self {
        Self {
            controller,
            resolver,
            filter,
            visit_budget: None,
            grace_period: Duration::ZERO,
            cancelled: None,
            visited: HashSet::new(),
        }
    }

    /// Cap on nodes expanded before `MaxAttemptsExhausted`. `None` is uncapped.
    pub fn with_visit_budget(mut self, budget: Option<usize>) -> Self {
        self.visit_budget = budget;
        self
    }

    /// Pause before each neighbor fetch.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    pub fn with_cancellation(mut self, cancelled: &'a AtomicBool) -> Self {
        self.cancelled = Some(cancelled);
        self
    }

    /// Nodes this spider has expanded.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Run a traversal from `seed`. Local state carries over between calls.
    pub fn crawl(&mut self, seed: Node, target: &Node) -> SearchState {
        crawl(self, seed, target)
    }

    fn rest(&self) {
        if !self.grace_period.is_zero() {
            std::thread::sleep(self.grace_period);
        }
    }
}

impl<R, F> Crawler for Spider<'_, R, F>
where
    R: NeighborResolver + ?Sized,
    F: LinkFilter + ?Sized,
{
    fn is_valid(&self, node: &Node) -> bool {
        !self.visited.contains(node)
    }

    fn evaluate(&self, path: &[Node], target: &Node) -> Status {
        let Some(node) = path.last() else {
            return Status::PathsExhausted;
        };
        let is_seed = path.len() == 1;

        if node == target {
            Status::FoundResult
        } else if self.visit_budget.is_some_and(|budget| self.visited.len() > budget) {
            Status::MaxAttemptsExhausted
        } else if self.visited.contains(node) || (!is_seed && self.controller.has_visited(node)) {
            // Seeds may be requeued nodes that were claimed in an earlier
            // epoch; only discovered nodes count as collisions.
            Status::Collision
        } else {
            Status::Working
        }
    }

    fn visit(&mut self, node: &Node) -> Vec<Node> {
        self.rest();

        let neighbors: Vec<Node> = adjacent_nodes(self.resolver, self.filter, node)
            .into_iter()
            .filter(|n| self.is_valid(n) && !self.controller.has_visited(n))
            .collect();

        self.controller.report_visited(node);
        self.visited.insert(node.clone());

        neighbors
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}
