//! Cache configuration parameters.

use twin_core::ConfigError;
use twin_pool::PoolConfig;

/// Configuration for a [`SecondChanceCache`](crate::SecondChanceCache).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of resident objects. Fixed for the cache's lifetime.
    pub capacity: usize,
    /// Arena backing the cached objects.
    pub pool: PoolConfig,
}

impl CacheConfig {
    /// Create a cache config with the default arena.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pool: PoolConfig::default(),
        }
    }

    /// Replace the arena configuration.
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Check structural invariants of the cache and its arena.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.pool.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(CacheConfig::new(0).validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn pool_errors_surface() {
        let config = CacheConfig::new(4).with_pool(PoolConfig::new(8, 2));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MinAboveMax { .. })
        ));
    }

    #[test]
    fn default_pool_is_used() {
        let config = CacheConfig::new(16);
        assert_eq!(config.pool, PoolConfig::default());
        assert!(config.validate().is_ok());
    }
}
