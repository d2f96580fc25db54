//! Block ledger configuration parameters.

use twin_core::{ConfigError, Power};

/// Configuration for a [`BuddyPool`](crate::BuddyPool).
///
/// Both sizes are given as powers of two. Validated at construction;
/// all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Smallest block the ledger hands out, as a power of two.
    ///
    /// Requests below `2^min_power` bytes are rounded up. Default: 4 (16 bytes).
    pub min_power: u32,

    /// Size of the whole arena, as a power of two.
    ///
    /// Reserved once at construction and never resized.
    /// Default: 20 (1 MiB).
    pub max_power: u32,
}

impl PoolConfig {
    /// Default smallest block: 16 bytes.
    pub const DEFAULT_MIN_POWER: u32 = 4;

    /// Default arena size: 1 MiB.
    pub const DEFAULT_MAX_POWER: u32 = 20;

    /// Largest arena power accepted on this platform.
    pub const MAX_SUPPORTED_POWER: u32 = usize::BITS - 2;

    /// Create a config with the given block and arena powers.
    pub fn new(min_power: u32, max_power: u32) -> Self {
        Self {
            min_power,
            max_power,
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_power > Self::MAX_SUPPORTED_POWER {
            return Err(ConfigError::PowerTooLarge {
                max_power: self.max_power,
                limit: Self::MAX_SUPPORTED_POWER,
            });
        }
        if self.min_power > self.max_power {
            return Err(ConfigError::MinAboveMax {
                min_power: self.min_power,
                max_power: self.max_power,
            });
        }
        Ok(())
    }

    /// Total arena size in bytes.
    pub fn arena_bytes(&self) -> usize {
        Power(self.max_power).bytes()
    }

    /// Size of the smallest block in bytes.
    pub fn min_block_bytes(&self) -> usize {
        Power(self.min_power).bytes()
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_POWER, Self::DEFAULT_MAX_POWER)
    }
}
