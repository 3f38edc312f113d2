//! Cache usage counters.

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Single-record lookups answered by the cache.
    pub hits: u64,
    /// Single-record lookups that went to a data source.
    pub misses: u64,
    /// Listings answered by the cache.
    pub list_hits: u64,
    /// Listings that went to a data source.
    pub list_misses: u64,
    /// Wholesale replacements from a bulk load.
    pub reloads: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate over all lookups (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits + self.list_hits;
        let total = hits + self.misses + self.list_misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
