//! Terminal-state model for bounded traversals

use crate::web::node::Node;
use std::fmt;

/// Outcome tag of a traversal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Still exploring; the only non-terminal status.
    Working,
    FoundResult,
    /// Reached a node some traversal has already claimed.
    Collision,
    /// Visit budget for this epoch used up.
    MaxAttemptsExhausted,
    /// Queue ran dry without reaching the target.
    PathsExhausted,
    Error,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Working)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Working => "working",
            Status::FoundResult => "found-result",
            Status::Collision => "collision",
            Status::MaxAttemptsExhausted => "max-attempts-exhausted",
            Status::PathsExhausted => "paths-exhausted",
            Status::Error => "error",
        };
        f.write_str(name)
    }
}

/// A traversal outcome: the path it ended on plus its status.
///
/// The payload is the current path for every status except
/// `PathsExhausted` and `Error`, which carry an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub path: Vec<Node>,
    pub status: Status,
}

impl SearchState {
    pub fn new(path: Vec<Node>, status: Status) -> Self {
        Self { path, status }
    }

    pub fn exhausted() -> Self {
        Self::new(Vec::new(), Status::PathsExhausted)
    }

    pub fn error() -> Self {
        Self::new(Vec::new(), Status::Error)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Last node of the payload, i.e. where the traversal stopped.
    pub fn terminal_node(&self) -> Option<&Node> {
        self.path.last()
    }
}
