//! Interfaces to the outside world: neighbor lookup and link filtering

use crate::error::ResolveError;
use crate::web::node::Node;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Looks up the outbound links of a page.
pub trait NeighborResolver: Send + Sync {
    /// Return the candidate identities linked from `node`, in page order.
    ///
    /// Failures are transient from the caller's point of view; traversals
    /// treat them as a page without links.
    fn resolve(&self, node: &Node) -> Result<Vec<String>, ResolveError>;
}

/// Decides which candidate links belong to the graph being searched.
pub trait LinkFilter: Send + Sync {
    fn is_acceptable(&self, candidate: &str) -> bool;

    /// Map an accepted candidate to the identity used for its node.
    fn canonicalize(&self, candidate: &str) -> String {
        candidate.to_string()
    }
}

/// Filter that keeps every candidate unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl LinkFilter for AcceptAll {
    fn is_acceptable(&self, _candidate: &str) -> bool {
        true
    }
}

/// Resolver backed by a fixed adjacency list.
///
/// Unknown nodes resolve to no neighbors. Once failing, calls return
/// [`ResolveError::Unavailable`], which is useful for exercising the
/// transient-failure path.
#[derive(Debug, Default)]
pub struct MapResolver {
    edges: HashMap<String, Vec<String>>,
    /// Lookups served before every later one fails.
    fail_after: Option<u64>,
    calls: AtomicU64,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(page, links)` pairs.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        let mut resolver = Self::new();
        for (from, to) in edges {
            resolver = resolver.with_links(from, to);
        }
        resolver
    }

    /// Add links from `from`, appending to any already present.
    pub fn with_links(mut self, from: &str, to: Vec<&str>) -> Self {
        self.edges
            .entry(from.to_string())
            .or_default()
            .extend(to.into_iter().map(str::to_string));
        self
    }

    /// Make every lookup fail.
    pub fn failing() -> Self {
        Self::new().failing_after(0)
    }

    /// Answer the first `served` lookups, then fail the rest.
    pub fn failing_after(mut self, served: u64) -> Self {
        self.fail_after = Some(served);
        self
    }

    /// Number of lookups served so far, failed ones included.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NeighborResolver for MapResolver {
    fn resolve(&self, node: &Node) -> Result<Vec<String>, ResolveError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|served| call >= served) {
            return Err(ResolveError::Unavailable(node.identity().to_string()));
        }
        Ok(self.edges.get(node.identity()).cloned().unwrap_or_default())
    }
}

/// Resolve `node` and turn the accepted links into child nodes.
///
/// Order follows the resolver, duplicates are dropped, and a resolver failure
/// yields an empty list after logging it.
pub fn adjacent_nodes<R, F>(resolver: &R, filter: &F, node: &Node) -> Vec<Node>
where
    R: NeighborResolver + ?Sized,
    F: LinkFilter + ?Sized,
{
    let candidates = match resolver.resolve(node) {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!(node = %node, error = %err, "failed to resolve neighbors");
            return Vec::new();
        }
    };

    let mut seen = std::collections::HashSet::new();
    candidates
        .iter()
        .filter(|candidate| filter.is_acceptable(candidate))
        .map(|candidate| filter.canonicalize(candidate))
        .filter(|identity| seen.insert(identity.clone()))
        .map(|identity| Node::with_parent(identity, node))
        .collect()
}
