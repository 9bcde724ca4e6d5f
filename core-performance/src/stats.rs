//! Cache statistics and monitoring

use serde::{Deserialize, Serialize};

/// Snapshot of the performance cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of items with a live cache entry
    pub items_cached: usize,

    /// Number of items whose last fetch failed persistently
    pub items_failed: usize,

    /// Total bytes across all materialized files
    pub total_bytes: u64,

    /// Timestamp when stats were calculated
    pub calculated_at: i64,
}

impl CacheStats {
    /// Calculate cache usage as a percentage of a size budget.
    pub fn usage_percentage(&self, max_size: u64) -> f64 {
        if max_size == 0 {
            return 0.0;
        }

        (self.total_bytes as f64 / max_size as f64) * 100.0
    }

    /// Returns true if the cache is near a size budget (>90%).
    ///
    /// Hosts use this as the quota-pressure signal to trigger a cache clear.
    pub fn is_near_capacity(&self, max_size: u64) -> bool {
        self.usage_percentage(max_size) > 90.0
    }

    /// Returns average bytes per cached item.
    pub fn average_item_size(&self) -> u64 {
        if self.items_cached == 0 {
            0
        } else {
            self.total_bytes / self.items_cached as u64
        }
    }

    /// Returns success rate percentage (cached / attempted).
    pub fn success_rate(&self) -> f64 {
        let attempted = self.items_cached + self.items_failed;
        if attempted == 0 {
            return 100.0;
        }

        (self.items_cached as f64 / attempted as f64) * 100.0
    }
}
