//! Path search over the link graph
//!
//! - `spider`: bounded breadth-first traversal from a single seed
//! - `controller`: visited set shared by every traversal of a session
//! - `parallel`: the epoch-synchronized search session
//! - `provider`: runs a session on a background thread

pub mod controller;
pub mod parallel;
pub mod provider;
pub mod result;
pub mod spider;
pub mod state;

pub use controller::Controller;
pub use parallel::{SearchSession, SessionConfig, run_search};
pub use provider::{SearchHandle, spawn_search};
pub use result::{SearchReport, SearchStatistics};
pub use spider::{Crawler, Spider, crawl};
pub use state::{SearchState, Status};
