//! Process-wide record of claimed nodes

use crate::web::node::Node;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Shared visited set consulted by every traversal of a search.
///
/// Both operations take the same lock, so a node reported by one worker is
/// visible to every later `has_visited` call from any other worker. The set
/// only ever grows; recovering the guard from a poisoned lock is sound.
#[derive(Debug, Default)]
pub struct Controller {
    visited: Mutex<HashSet<String>>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `node`. Returns `true` if this call recorded it.
    pub fn report_visited(&self, node: &Node) -> bool {
        let mut visited = self.lock();
        if visited.contains(node.identity()) {
            return false;
        }
        visited.insert(node.identity().to_string())
    }

    pub fn has_visited(&self, node: &Node) -> bool {
        self.lock().contains(node.identity())
    }

    /// Number of distinct nodes claimed so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
