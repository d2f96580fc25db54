//! The block ledger paired with its arena reservation.

use twin_core::{BlockOffset, PoolError};

use crate::config::PoolConfig;
use crate::ledger::BlockLedger;
use crate::raw::RawArena;
use crate::stats::PoolStats;

/// A fixed arena of `2^max_power` bytes carved into buddy blocks.
///
/// The arena is reserved once at construction and released when the pool
/// is dropped. Callers address blocks by [`BlockOffset`]; the byte span of
/// a block they own is reachable through [`bytes`](Self::bytes) and
/// [`bytes_mut`](Self::bytes_mut).
///
/// # Example
///
/// ```
/// use twin_pool::{BuddyPool, PoolConfig};
///
/// let mut pool = BuddyPool::new(PoolConfig::new(4, 10)).unwrap();
/// let block = pool.allocate(100).unwrap();
/// assert_eq!(pool.bytes(block).unwrap().len(), 128);
/// pool.deallocate(block).unwrap();
/// assert!(pool.ledger().is_quiescent());
/// ```
pub struct BuddyPool {
    ledger: BlockLedger,
    arena: RawArena,
}

impl BuddyPool {
    /// Validate `config` and reserve the arena.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let ledger = BlockLedger::new(config)?;
        let arena = RawArena::new(ledger.capacity())?;
        log::debug!(
            "reserved {}-byte arena, smallest block {} bytes",
            arena.len(),
            ledger.config().min_block_bytes()
        );
        Ok(Self { ledger, arena })
    }

    /// Reserve a block of at least `size` bytes.
    ///
    /// Fails with [`PoolError::OutOfMemory`] when no free block is large
    /// enough. The arena never grows.
    pub fn allocate(&mut self, size: usize) -> Result<BlockOffset, PoolError> {
        self.ledger.allocate(size)
    }

    /// Return the block starting at `offset` to the free list.
    pub fn deallocate(&mut self, offset: BlockOffset) -> Result<(), PoolError> {
        self.ledger.deallocate(offset)
    }

    /// The bytes of the allocated block starting at `offset`.
    pub fn bytes(&self, offset: BlockOffset) -> Result<&[u8], PoolError> {
        let len = self.used_block_len(offset)?;
        Ok(self.arena.bytes(offset.0, len))
    }

    /// The bytes of the allocated block starting at `offset`, mutably.
    pub fn bytes_mut(&mut self, offset: BlockOffset) -> Result<&mut [u8], PoolError> {
        let len = self.used_block_len(offset)?;
        Ok(self.arena.bytes_mut(offset.0, len))
    }

    fn used_block_len(&self, offset: BlockOffset) -> Result<usize, PoolError> {
        match self.ledger.block(offset) {
            Some(block) if block.is_used() => Ok(block.span()),
            _ => Err(PoolError::UnknownBlock { offset }),
        }
    }

    /// Block bookkeeping for inspection.
    pub fn ledger(&self) -> &BlockLedger {
        &self.ledger
    }

    /// Allocation counters.
    pub fn stats(&self) -> &PoolStats {
        self.ledger.stats()
    }

    /// The configuration this pool was built with.
    pub fn config(&self) -> &PoolConfig {
        self.ledger.config()
    }

    pub(crate) fn raw(&self) -> &RawArena {
        &self.arena
    }

    pub(crate) fn raw_mut(&mut self) -> &mut RawArena {
        &mut self.arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_core::ConfigError;

    fn pool() -> BuddyPool {
        BuddyPool::new(PoolConfig::new(4, 10)).unwrap()
    }

    #[test]
    fn invalid_config_surfaces_as_config_error() {
        let err = BuddyPool::new(PoolConfig::new(9, 3)).err().unwrap();
        assert_eq!(
            err,
            PoolError::Config(ConfigError::MinAboveMax {
                min_power: 9,
                max_power: 3
            })
        );
    }

    #[test]
    fn block_bytes_span_the_whole_block() {
        let mut p = pool();
        let off = p.allocate(20).unwrap();
        let bytes = p.bytes_mut(off).unwrap();
        assert_eq!(bytes.len(), 32);
        bytes.fill(0xAB);
        assert!(p.bytes(off).unwrap().iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn neighbouring_blocks_do_not_alias() {
        let mut p = pool();
        let a = p.allocate(16).unwrap();
        let b = p.allocate(16).unwrap();
        p.bytes_mut(a).unwrap().fill(1);
        p.bytes_mut(b).unwrap().fill(2);
        assert!(p.bytes(a).unwrap().iter().all(|&x| x == 1));
        assert!(p.bytes(b).unwrap().iter().all(|&x| x == 2));
    }

    #[test]
    fn freed_blocks_have_no_byte_view() {
        let mut p = pool();
        let off = p.allocate(16).unwrap();
        p.deallocate(off).unwrap();
        assert_eq!(
            p.bytes(off).err(),
            Some(PoolError::UnknownBlock { offset: off })
        );
        assert!(p.bytes_mut(BlockOffset(8)).is_err());
    }

    #[test]
    fn stats_visible_through_pool() {
        let mut p = pool();
        let off = p.allocate(64).unwrap();
        assert_eq!(p.stats().allocations, 1);
        p.deallocate(off).unwrap();
        assert_eq!(p.stats().deallocations, 1);
        assert_eq!(p.config(), &PoolConfig::new(4, 10));
    }
}
