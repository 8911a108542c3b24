//! Epoch-synchronized parallel search.
//!
//! # Architecture
//!
//! - A **coordinator** owns the frontier and runs the epoch loop
//! - A pool of **workers**, each running one bounded traversal per task
//! - A **channel system** carrying tasks out and outcomes back
//! - An **admission gate** and an **epoch barrier** pacing the workers
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wikispider::search::parallel::{SearchSession, SessionConfig};
//! use wikispider::web::{Node, WikiFilter, WikiResolver};
//!
//! let config = SessionConfig::default().with_workers(4).with_max_chances(20);
//! let mut session = SearchSession::new(
//!     config,
//!     Arc::new(WikiResolver::new()?),
//!     Arc::new(WikiFilter::new()),
//! )?;
//! session.search(Node::root("/Rust"), Node::root("/Graph_theory"))?;
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;
pub mod sync;

pub use channel::SessionStatus;
pub use config::SessionConfig;
pub use coordinator::{SearchSession, run_search};
