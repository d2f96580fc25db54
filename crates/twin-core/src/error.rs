//! Error types for the twin arena allocator.
//!
//! Organized by layer: configuration, the block ledger and typed
//! allocator (which share [`PoolError`]), and the object cache.

use std::error::Error;
use std::fmt;

use crate::id::BlockOffset;

/// Errors detected while validating pool or cache parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `min_power` is larger than `max_power`.
    MinAboveMax {
        /// The configured smallest block power.
        min_power: u32,
        /// The configured arena power.
        max_power: u32,
    },
    /// The arena would not be addressable on this platform.
    PowerTooLarge {
        /// The configured arena power.
        max_power: u32,
        /// Largest supported arena power.
        limit: u32,
    },
    /// A cache must be able to hold at least one entry.
    ZeroCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinAboveMax {
                min_power,
                max_power,
            } => {
                write!(
                    f,
                    "min_power {min_power} is larger than max_power {max_power}"
                )
            }
            Self::PowerTooLarge { max_power, limit } => {
                write!(f, "max_power {max_power} exceeds the supported limit {limit}")
            }
            Self::ZeroCapacity => write!(f, "cache capacity must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

/// Errors from the block ledger and the typed allocator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// No free block of sufficient size exists anywhere in the arena.
    ///
    /// The arena never grows, so retrying without an intervening
    /// deallocation cannot succeed.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
        /// Size of the largest free block, if any block is free.
        largest_free: Option<usize>,
    },
    /// The offset does not start any block tracked by the ledger.
    InvalidDeallocation {
        /// The offending offset.
        offset: BlockOffset,
    },
    /// The offset starts a block that is already free.
    DoubleFree {
        /// The offending offset.
        offset: BlockOffset,
    },
    /// The offset does not start a block currently handed out.
    UnknownBlock {
        /// The offending offset.
        offset: BlockOffset,
    },
    /// The type's alignment is stricter than the arena base alignment.
    UnsupportedAlignment {
        /// Alignment required by the type.
        align: usize,
        /// Alignment guaranteed by the arena.
        max: usize,
    },
    /// A slot was presented to an allocator that did not create it.
    ForeignSlot,
    /// The system allocator refused to reserve the arena.
    ReservationFailed {
        /// Size of the arena that could not be reserved.
        bytes: usize,
    },
    /// The pool configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                largest_free,
            } => {
                write!(f, "out of arena memory: requested {requested} bytes")?;
                match largest_free {
                    Some(bytes) => write!(f, ", largest free block {bytes} bytes"),
                    None => write!(f, ", no free blocks"),
                }
            }
            Self::InvalidDeallocation { offset } => {
                write!(f, "offset {offset} is not tracked by the ledger")
            }
            Self::DoubleFree { offset } => {
                write!(f, "block at {offset} is already free")
            }
            Self::UnknownBlock { offset } => {
                write!(f, "no allocated block starts at {offset}")
            }
            Self::UnsupportedAlignment { align, max } => {
                write!(f, "alignment {align} exceeds arena alignment {max}")
            }
            Self::ForeignSlot => write!(f, "slot belongs to a different allocator"),
            Self::ReservationFailed { bytes } => {
                write!(f, "failed to reserve a {bytes}-byte arena")
            }
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for PoolError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Errors from the second-chance cache.
///
/// A cache miss is not an error; it is the trigger for insertion or
/// eviction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheError {
    /// The backing allocator could not provide a slot for a new entry.
    Allocation(PoolError),
    /// The cache configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation(e) => write!(f, "allocation: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Allocation(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

impl From<PoolError> for CacheError {
    fn from(e: PoolError) -> Self {
        match e {
            PoolError::Config(c) => Self::Config(c),
            other => Self::Allocation(other),
        }
    }
}

impl From<ConfigError> for CacheError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_message_mentions_largest_block() {
        let e = PoolError::OutOfMemory {
            requested: 100,
            largest_free: Some(64),
        };
        assert_eq!(
            e.to_string(),
            "out of arena memory: requested 100 bytes, largest free block 64 bytes"
        );
        let e = PoolError::OutOfMemory {
            requested: 1,
            largest_free: None,
        };
        assert!(e.to_string().ends_with("no free blocks"));
    }

    #[test]
    fn cache_error_chains_source() {
        let e = CacheError::from(PoolError::DoubleFree {
            offset: BlockOffset(16),
        });
        assert!(matches!(e, CacheError::Allocation(_)));
        let source = e.source().unwrap();
        assert_eq!(source.to_string(), "block at 0x10 is already free");
    }

    #[test]
    fn pool_config_error_lifts_to_cache_config_error() {
        let e = CacheError::from(PoolError::from(ConfigError::ZeroCapacity));
        assert_eq!(e, CacheError::Config(ConfigError::ZeroCapacity));
    }

    #[test]
    fn config_error_display() {
        let e = ConfigError::MinAboveMax {
            min_power: 8,
            max_power: 4,
        };
        assert_eq!(e.to_string(), "min_power 8 is larger than max_power 4");
    }
}
