//! Hit, miss and eviction counters for the cache.

/// Counters updated by every [`get`](crate::SecondChanceCache::get).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered by a resident entry.
    pub hits: u64,
    /// Lookups that constructed a new entry.
    pub misses: u64,
    /// Entries destroyed to make room.
    pub evictions: u64,
    /// Used entries spared by the eviction scan and moved to the front.
    pub second_chances: u64,
}

impl CacheStats {
    /// Fraction of lookups that hit, or `None` before the first lookup.
    pub fn hit_ratio(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        (total > 0).then(|| self.hits as f64 / total as f64)
    }
}
