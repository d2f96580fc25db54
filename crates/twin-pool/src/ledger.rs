//! Buddy-system bookkeeping over arena offsets.
//!
//! [`BlockLedger`] tracks every block of the arena, used or free, keyed by
//! offset, plus a free-list index keyed by size class. It never touches
//! memory; [`BuddyPool`](crate::BuddyPool) pairs it with the reservation.
//!
//! Allocation picks the free block with the smallest sufficient power and,
//! within that size class, the lowest offset. Both choices come from
//! ordered maps, so the outcome depends only on which size classes are
//! free, never on the order blocks were released in.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace, warn};
use smallvec::SmallVec;
use twin_core::{ceil_log2, BlockOffset, ConfigError, PoolError, Power};

use crate::block::Block;
use crate::config::PoolConfig;
use crate::stats::PoolStats;

/// Per-size-class count of free blocks, smallest power first.
pub type FreeHistogram = SmallVec<[(Power, usize); 8]>;

/// Offset-keyed record of every block in the arena.
pub struct BlockLedger {
    config: PoolConfig,
    /// Every tracked block, used or free. Together they tile the arena.
    blocks: BTreeMap<BlockOffset, Block>,
    /// Free blocks by size class. Empty buckets are removed.
    free: BTreeMap<Power, BTreeSet<BlockOffset>>,
    stats: PoolStats,
}

impl BlockLedger {
    /// Create a ledger holding one free block that spans the whole arena.
    pub fn new(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let root = Block::new(BlockOffset::ZERO, Power(config.max_power), false);
        let mut ledger = Self {
            config,
            blocks: BTreeMap::new(),
            free: BTreeMap::new(),
            stats: PoolStats::default(),
        };
        ledger.blocks.insert(root.offset, root);
        ledger.insert_free(root.offset, root.power);
        Ok(ledger)
    }

    /// The size class `allocate(size)` would hand out.
    pub fn target_power(&self, size: usize) -> Power {
        Power(ceil_log2(size).max(self.config.min_power))
    }

    /// Reserve a block of at least `size` bytes.
    ///
    /// Splits the tightest-fitting free block down to the target size
    /// class; each split returns the upper half to the free list and keeps
    /// halving the lower half.
    pub fn allocate(&mut self, size: usize) -> Result<BlockOffset, PoolError> {
        let target = self.target_power(size);
        let Some((found, offset)) = self.tightest_free(target) else {
            self.stats.failed_allocations += 1;
            let largest_free = self.largest_free_power().map(Power::bytes);
            debug!("allocation of {size} bytes failed, largest free block {largest_free:?}");
            return Err(PoolError::OutOfMemory {
                requested: size,
                largest_free,
            });
        };

        self.remove_free(offset, found);
        let mut power = found;
        while power > target {
            power = power.half();
            let upper = BlockOffset(offset.0 + power.bytes());
            self.blocks.insert(upper, Block::new(upper, power, false));
            self.insert_free(upper, power);
            self.stats.splits += 1;
            trace!("split {offset}: upper half {upper} at {power} returned to free list");
        }
        self.blocks.insert(offset, Block::new(offset, target, true));
        self.stats.record_allocation(target.bytes());
        trace!("allocated {target} block at {offset} for {size} bytes");
        Ok(offset)
    }

    /// Release the block starting at `offset` and merge it with free buddies.
    ///
    /// Merging repeats up the size classes until the buddy is in use, has
    /// been split into smaller blocks, or the block spans the whole arena.
    pub fn deallocate(&mut self, offset: BlockOffset) -> Result<(), PoolError> {
        let released = match self.blocks.get(&offset) {
            Some(block) if block.used => block.power,
            Some(_) => {
                warn!("double free of block at {offset}");
                return Err(PoolError::DoubleFree { offset });
            }
            None => {
                warn!("deallocation of untracked offset {offset}");
                return Err(PoolError::InvalidDeallocation { offset });
            }
        };

        let max = Power(self.config.max_power);
        let mut offset = offset;
        let mut power = released;
        while power < max {
            let buddy = offset.buddy(power);
            match self.blocks.get(&buddy) {
                Some(b) if !b.used && b.power == power => {}
                _ => break,
            }
            self.remove_free(buddy, power);
            self.blocks.remove(&buddy);
            self.blocks.remove(&offset);
            offset = offset.min(buddy);
            power = power.double();
            self.stats.merges += 1;
            trace!("merged buddies into {power} block at {offset}");
        }
        self.blocks.insert(offset, Block::new(offset, power, false));
        self.insert_free(offset, power);
        self.stats.record_deallocation(released.bytes());
        Ok(())
    }

    fn tightest_free(&self, target: Power) -> Option<(Power, BlockOffset)> {
        self.free
            .range(target..)
            .find_map(|(&power, offsets)| offsets.first().map(|&offset| (power, offset)))
    }

    fn insert_free(&mut self, offset: BlockOffset, power: Power) {
        self.free.entry(power).or_default().insert(offset);
    }

    fn remove_free(&mut self, offset: BlockOffset, power: Power) {
        if let Some(bucket) = self.free.get_mut(&power) {
            bucket.remove(&offset);
            if bucket.is_empty() {
                self.free.remove(&power);
            }
        }
    }

    /// The block starting at `offset`, if one is tracked.
    pub fn block(&self, offset: BlockOffset) -> Option<&Block> {
        self.blocks.get(&offset)
    }

    /// Every tracked block in address order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Number of tracked blocks, used and free.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Free offsets of exactly the given size class, lowest first.
    pub fn free_blocks(&self, power: Power) -> impl Iterator<Item = BlockOffset> + '_ {
        self.free.get(&power).into_iter().flatten().copied()
    }

    /// Number of free blocks in each non-empty size class.
    pub fn free_histogram(&self) -> FreeHistogram {
        self.free
            .iter()
            .map(|(&power, offsets)| (power, offsets.len()))
            .collect()
    }

    /// Size class of the largest free block.
    pub fn largest_free_power(&self) -> Option<Power> {
        self.free.keys().next_back().copied()
    }

    /// Total arena size in bytes.
    pub fn capacity(&self) -> usize {
        self.config.arena_bytes()
    }

    /// Bytes in blocks currently handed out.
    pub fn used_bytes(&self) -> usize {
        self.stats.bytes_in_use
    }

    /// Bytes in free blocks.
    pub fn free_bytes(&self) -> usize {
        self.capacity() - self.used_bytes()
    }

    /// Whether the arena is back to a single free block.
    pub fn is_quiescent(&self) -> bool {
        self.blocks.len() == 1
            && self
                .free_blocks(Power(self.config.max_power))
                .eq(std::iter::once(BlockOffset::ZERO))
    }

    /// The configuration this ledger was built with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Allocation counters.
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Check every structural invariant of the ledger.
    ///
    /// - Tracked blocks tile the arena with no gap and no overlap.
    /// - Every block is aligned to its own size and within size bounds.
    /// - The free index lists exactly the free blocks, under their power.
    /// - No two free buddies of equal power are left unmerged.
    pub fn audit(&self) -> Result<(), String> {
        let max = Power(self.config.max_power);
        let min = Power(self.config.min_power);
        let mut cursor = 0usize;
        let mut free_blocks = 0usize;
        let mut used_bytes = 0usize;

        for (&offset, block) in &self.blocks {
            if offset != block.offset {
                return Err(format!("block {block} filed under {offset}"));
            }
            if offset.0 != cursor {
                return Err(format!("expected a block at {cursor:#x}, found {block}"));
            }
            if block.power > max || block.power < min {
                return Err(format!("{block} outside size classes {min}..={max}"));
            }
            if !offset.is_aligned_to(block.power) {
                return Err(format!("{block} is not aligned to its size"));
            }
            let indexed = self
                .free
                .get(&block.power)
                .is_some_and(|bucket| bucket.contains(&offset));
            if block.used {
                used_bytes += block.span();
                if indexed {
                    return Err(format!("{block} is used but on the free list"));
                }
            } else {
                free_blocks += 1;
                if !indexed {
                    return Err(format!("{block} is free but missing from the free list"));
                }
                if let Some(twin) = block.twin(max) {
                    if let Some(buddy) = self.blocks.get(&twin) {
                        if !buddy.used && buddy.power == block.power {
                            return Err(format!("free buddies {block} and {buddy} not merged"));
                        }
                    }
                }
            }
            cursor = block.end();
        }

        if cursor != self.capacity() {
            return Err(format!(
                "blocks cover {cursor} of {} arena bytes",
                self.capacity()
            ));
        }
        if self.free.values().any(BTreeSet::is_empty) {
            return Err("empty free-list bucket retained".to_string());
        }
        let indexed: usize = self.free.values().map(BTreeSet::len).sum();
        if indexed != free_blocks {
            return Err(format!(
                "free list holds {indexed} entries for {free_blocks} free blocks"
            ));
        }
        if used_bytes != self.stats.bytes_in_use {
            return Err(format!(
                "used blocks span {used_bytes} bytes, stats say {}",
                self.stats.bytes_in_use
            ));
        }
        Ok(())
    }
}
