//! The link graph: nodes, neighbor resolution and Wikipedia specifics

pub mod node;
pub mod resolver;
pub mod wiki;

pub use node::Node;
pub use resolver::{AcceptAll, LinkFilter, MapResolver, NeighborResolver, adjacent_nodes};
pub use wiki::{WikiFilter, WikiResolver};
