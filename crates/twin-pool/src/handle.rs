//! Typed slot handles.
//!
//! A [`Slot`] names one object living in a [`TypedAllocator`](crate::TypedAllocator)'s
//! arena. It is the unique owner of that object: slots cannot be cloned,
//! and giving one back through `destroy` or `take` is the only way to end
//! the object's life before the allocator itself is dropped.

use std::fmt;
use std::marker::PhantomData;

use twin_core::{AllocatorId, BlockOffset};

/// Owning handle to a `T` stored in a typed allocator's arena.
#[must_use = "dropping a slot leaks its object until the allocator is dropped"]
pub struct Slot<T> {
    pub(crate) owner: AllocatorId,
    pub(crate) offset: BlockOffset,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Slot<T> {
    pub(crate) fn new(owner: AllocatorId, offset: BlockOffset) -> Self {
        Self {
            owner,
            offset,
            _marker: PhantomData,
        }
    }

    /// Start of the block holding the object.
    pub fn offset(&self) -> BlockOffset {
        self.offset
    }

    /// The allocator that created this slot.
    pub fn owner(&self) -> AllocatorId {
        self.owner
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("owner", &self.owner)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T> fmt::Display for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot(alloc={}, off={})", self.owner, self.offset)
    }
}
