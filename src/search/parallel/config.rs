//! Configuration for search sessions.

use crate::error::ConfigError;
use std::time::Duration;

/// Configuration for a search session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of worker threads, and the most traversals run per epoch.
    pub num_workers: usize,
    /// Nodes a traversal may expand per epoch. Zero or negative disables the cap.
    pub max_chances_per_epoch: i64,
    /// Pause before every neighbor fetch.
    pub connection_grace_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            max_chances_per_epoch: 0,
            connection_grace_period: Duration::ZERO,
        }
    }
}

impl SessionConfig {
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_max_chances(mut self, max_chances_per_epoch: i64) -> Self {
        self.max_chances_per_epoch = max_chances_per_epoch;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.connection_grace_period = grace_period;
        self
    }

    pub fn with_grace_period_millis(self, millis: u64) -> Self {
        self.with_grace_period(Duration::from_millis(millis))
    }

    /// Visit budget handed to each traversal, `None` when uncapped.
    pub fn visit_budget(&self) -> Option<usize> {
        usize::try_from(self.max_chances_per_epoch)
            .ok()
            .filter(|&budget| budget > 0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.num_workers));
        }
        Ok(())
    }
}
