//! Configuration for the processor module.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Largest pool the worker semaphore can represent.
pub const MAX_POOL_SIZE: usize = Semaphore::MAX_PERMITS;

/// Configuration for the bulk item processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Number of units of work allowed to run at once.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Upper bound for a whole processing run, applied by callers that
    /// need one (the HTTP binding does).
    #[serde(default = "default_run_timeout")]
    pub run_timeout_secs: u64,
}

fn default_pool_size() -> usize {
    10
}

fn default_run_timeout() -> u64 {
    300 // 5 minutes
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            run_timeout_secs: default_run_timeout(),
        }
    }
}

impl ProcessorConfig {
    /// Sets the worker pool size.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Sets the run timeout in seconds.
    pub fn with_run_timeout_secs(mut self, secs: u64) -> Self {
        self.run_timeout_secs = secs;
        self
    }

    /// Run timeout as a [`Duration`].
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_pool_size_matches_semaphore_limit() {
        assert_eq!(MAX_POOL_SIZE, Semaphore::MAX_PERMITS);
        assert!(MAX_POOL_SIZE > default_pool_size());
    }

    #[test]
    fn test_default_config() {
        let config = ProcessorConfig::default();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.run_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_config_builder() {
        let config = ProcessorConfig::default()
            .with_pool_size(3)
            .with_run_timeout_secs(5);

        assert_eq!(config.pool_size, 3);
        assert_eq!(config.run_timeout_secs, 5);
    }
}
