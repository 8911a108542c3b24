//! Graph node with a back-reference to the node it was discovered from

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A page in the link graph.
///
/// Cloning is cheap: the identity and the parent chain are shared. Equality,
/// ordering and hashing only look at the identity, so the same page reached
/// along two different routes compares equal.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    identity: String,
    parent: Option<Node>,
    depth: usize,
}

impl Node {
    /// Create a node with no parent.
    pub fn root(identity: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                identity: identity.into(),
                parent: None,
                depth: 0,
            }),
        }
    }

    /// Create a node discovered from `parent`.
    pub fn with_parent(identity: impl Into<String>, parent: &Node) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                identity: identity.into(),
                parent: Some(parent.clone()),
                depth: parent.depth() + 1,
            }),
        }
    }

    pub fn identity(&self) -> &str {
        &self.inner.identity
    }

    pub fn parent(&self) -> Option<&Node> {
        self.inner.parent.as_ref()
    }

    /// Number of parent links between this node and its root.
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    /// Walk the parent chain, closest node first.
    pub fn path_to_root(&self) -> Vec<Node> {
        let mut path = Vec::with_capacity(self.depth() + 1);
        let mut next = Some(self);
        while let Some(node) = next {
            path.push(node.clone());
            next = node.parent();
        }
        path
    }

    /// The discovered path in presentation order, root first.
    pub fn path_from_root(&self) -> Vec<Node> {
        let mut path = self.path_to_root();
        path.reverse();
        path
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(other.identity())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identity())
    }
}

// Parent chains can be long; print only the identity and depth.
impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("identity", &self.identity())
            .field("depth", &self.depth())
            .finish()
    }
}

/// Identities of a path, in the order given.
pub fn identities(path: &[Node]) -> Vec<&str> {
    path.iter().map(Node::identity).collect()
}
