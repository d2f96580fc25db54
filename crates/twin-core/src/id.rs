//! Strongly-typed identifiers for arena blocks and size classes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Byte offset of a block from the start of the arena.
///
/// Offsets are the only way blocks are addressed. A block of power `p`
/// always starts at a multiple of `2^p`, which is what makes the buddy
/// of a block computable with a single XOR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockOffset(pub usize);

impl BlockOffset {
    /// The arena origin.
    pub const ZERO: Self = Self(0);

    /// Offset of the buddy of a block of the given power starting here.
    ///
    /// The buddy is the other half of the block of `power + 1` that
    /// contains this one.
    pub fn buddy(self, power: Power) -> Self {
        Self(self.0 ^ power.bytes())
    }

    /// Whether this offset is aligned to a block of the given power.
    pub fn is_aligned_to(self, power: Power) -> bool {
        self.0 & (power.bytes() - 1) == 0
    }
}

impl fmt::Display for BlockOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<usize> for BlockOffset {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Size class of a block: the block spans `2^power` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Power(pub u32);

impl Power {
    /// Span of a block of this size class, in bytes.
    ///
    /// # Panics
    ///
    /// Panics if `2^power` does not fit in a `usize`. Ledger configs are
    /// validated against that limit before any block exists.
    pub fn bytes(self) -> usize {
        1usize << self.0
    }

    /// The size class of the two halves produced by splitting.
    pub fn half(self) -> Self {
        Self(self.0 - 1)
    }

    /// The size class produced by merging two buddies.
    pub fn double(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "2^{}", self.0)
    }
}

impl From<u32> for Power {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Smallest `p` such that `2^p >= size`.
///
/// Zero- and one-byte requests both map to power 0. Sizes above
/// `usize::MAX / 2 + 1` map to `usize::BITS`, which no arena can satisfy.
pub fn ceil_log2(size: usize) -> u32 {
    if size <= 1 {
        0
    } else {
        usize::BITS - (size - 1).leading_zeros()
    }
}

/// Counter for unique [`AllocatorId`] allocation.
static ALLOCATOR_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a typed allocator.
///
/// Allocated from a monotonic atomic counter via [`AllocatorId::next`].
/// Slots carry the id of the allocator that created them, so a slot
/// presented to a different allocator is rejected even if its offset
/// happens to be live there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocatorId(u64);

impl AllocatorId {
    /// Allocate a fresh, unique instance ID.
    ///
    /// Each call returns a new ID that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(ALLOCATOR_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AllocatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
