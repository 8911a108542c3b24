//! Search statistics and the printable search report

use crate::error::SearchError;
use crate::search::state::Status;
use crate::web::node::Node;
use std::time::Duration;

/// Counters collected by a search session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Epochs started
    pub epochs: u64,
    /// Bounded traversals dispatched across all epochs
    pub traversals_dispatched: u64,
    pub found_results: u64,
    pub collisions: u64,
    pub max_attempts_exhausted: u64,
    pub paths_exhausted: u64,
    pub errors: u64,
    /// Distinct nodes claimed by any worker
    pub nodes_visited: usize,
    /// Nodes still waiting in the frontier when the search ended
    pub frontier_remaining: usize,
    /// Total time spent searching
    pub elapsed_time: Duration,
}

impl SearchStatistics {
    /// Count one terminal outcome.
    pub fn record(&mut self, status: Status) {
        match status {
            Status::FoundResult => self.found_results += 1,
            Status::Collision => self.collisions += 1,
            Status::MaxAttemptsExhausted => self.max_attempts_exhausted += 1,
            Status::PathsExhausted => self.paths_exhausted += 1,
            Status::Error => self.errors += 1,
            Status::Working => {}
        }
    }

    /// Outcomes recorded so far.
    pub fn outcomes(&self) -> u64 {
        self.found_results
            + self.collisions
            + self.max_attempts_exhausted
            + self.paths_exhausted
            + self.errors
    }

    /// Get nodes claimed per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.nodes_visited as f64 / secs
        }
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Epochs: {}\n", self.epochs));
        s.push_str(&format!(
            "Traversals dispatched: {}\n",
            self.traversals_dispatched
        ));
        s.push_str(&format!("Nodes visited: {}\n", self.nodes_visited));
        s.push_str(&format!("Throughput: {:.1} nodes/sec\n", self.throughput()));

        if self.collisions > 0 {
            s.push_str(&format!("Collisions: {}\n", self.collisions));
        }
        if self.max_attempts_exhausted > 0 {
            s.push_str(&format!(
                "Budget exhausted: {}\n",
                self.max_attempts_exhausted
            ));
        }
        if self.paths_exhausted > 0 {
            s.push_str(&format!("Paths exhausted: {}\n", self.paths_exhausted));
        }
        if self.errors > 0 {
            s.push_str(&format!("Errors: {}\n", self.errors));
        }
        s.push_str(&format!("Frontier remaining: {}\n", self.frontier_remaining));

        s
    }
}

/// Final view of a session for display.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub start: Node,
    pub target: Node,
    pub solution: Vec<Node>,
    pub error: Option<SearchError>,
    pub statistics: SearchStatistics,
}

impl SearchReport {
    pub fn solution_found(&self) -> bool {
        !self.solution.is_empty()
    }

    /// Number of links followed, if a path was found.
    pub fn hops(&self) -> Option<usize> {
        self.solution.len().checked_sub(1)
    }
}

impl std::fmt::Display for SearchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.solution_found() {
            writeln!(
                f,
                "Path found from {} to {} ({} hops):",
                self.start,
                self.target,
                self.hops().unwrap_or(0)
            )?;
            for (i, node) in self.solution.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, node)?;
            }
        } else {
            writeln!(f, "No path found from {} to {}.", self.start, self.target)?;
        }
        if let Some(ref error) = self.error {
            writeln!(f, "Search stopped on error: {}", error)?;
        }
        Ok(())
    }
}
