//! wikispider - finds a hyperlink path between two Wikipedia articles.
//!
//! The search runs in epochs: a pool of workers each expands one frontier
//! seed with a bounded breadth-first traversal, a shared visited set keeps
//! workers off each other's ground, and every epoch ends at a rendezvous
//! where the orchestrator collects outcomes and refills the frontier.

pub mod error;
pub mod search;
pub mod web;
