//! Allocation counters for the block ledger.

/// Counters updated by every ledger operation.
///
/// Byte figures count whole blocks, so `bytes_in_use` includes the
/// rounding from requested size up to the block's power of two.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful `allocate` calls.
    pub allocations: u64,
    /// Successful `deallocate` calls.
    pub deallocations: u64,
    /// `allocate` calls that found no sufficiently large block.
    pub failed_allocations: u64,
    /// Block halvings performed while allocating.
    pub splits: u64,
    /// Buddy merges performed while deallocating.
    pub merges: u64,
    /// Bytes currently handed out.
    pub bytes_in_use: usize,
    /// High-water mark of `bytes_in_use`.
    pub peak_bytes_in_use: usize,
}

impl PoolStats {
    pub(crate) fn record_allocation(&mut self, block_bytes: usize) {
        self.allocations += 1;
        self.bytes_in_use += block_bytes;
        self.peak_bytes_in_use = self.peak_bytes_in_use.max(self.bytes_in_use);
    }

    pub(crate) fn record_deallocation(&mut self, block_bytes: usize) {
        self.deallocations += 1;
        self.bytes_in_use -= block_bytes;
    }

    /// Blocks currently handed out.
    pub fn live_blocks(&self) -> u64 {
        self.allocations - self.deallocations
    }
}
