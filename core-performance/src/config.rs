//! Performance cache configuration

use std::time::Duration;

/// Configuration for the performance cache and populator.
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// Timeout for a single fetch attempt (default: 12s).
    ///
    /// A hanging fetch must never block cache readiness for other items.
    pub fetch_timeout: Duration,

    /// Total fetch attempts per item, including the first (default: 2).
    pub max_fetch_attempts: u32,

    /// Base delay before a retry; doubles per attempt (default: 250ms).
    pub retry_base_delay: Duration,

    /// Number of concurrent fetches allowed during a warm pass (default: 4).
    pub max_concurrent_fetches: usize,

    /// Subdirectory of the app cache directory for materialized files.
    pub cache_directory: String,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(12),
            max_fetch_attempts: 2,
            retry_base_delay: Duration::from_millis(250),
            max_concurrent_fetches: 4,
            cache_directory: "performance_cache".to_string(),
        }
    }
}

impl PerformanceConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-attempt fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the total number of fetch attempts per item.
    pub fn with_max_fetch_attempts(mut self, attempts: u32) -> Self {
        self.max_fetch_attempts = attempts;
        self
    }

    /// Set the retry base delay.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Set the maximum number of concurrent fetches.
    pub fn with_max_concurrent_fetches(mut self, count: usize) -> Self {
        self.max_concurrent_fetches = count;
        self
    }

    /// Set the cache subdirectory name.
    pub fn with_cache_directory(mut self, dir: impl Into<String>) -> Self {
        self.cache_directory = dir.into();
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.fetch_timeout.is_zero() {
            return Err("fetch_timeout must be greater than zero".to_string());
        }

        if self.max_fetch_attempts == 0 {
            return Err("max_fetch_attempts must be at least 1".to_string());
        }

        if self.max_concurrent_fetches == 0 {
            return Err("max_concurrent_fetches must be at least 1".to_string());
        }

        if self.cache_directory.is_empty() {
            return Err("cache_directory cannot be empty".to_string());
        }

        Ok(())
    }
}
