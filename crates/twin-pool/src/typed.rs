//! Typed object placement on top of the buddy pool.
//!
//! [`TypedAllocator`] is the only place where arena bytes become typed
//! values. `create` asks the pool for a block large enough for `T`, moves
//! the value into it and records a type-erased destructor for that block;
//! `destroy` runs the destructor and only then returns the block.

use std::marker::PhantomData;
use std::mem;

use indexmap::IndexMap;
use log::trace;
use twin_core::{AllocatorId, BlockOffset, PoolError};

use crate::config::PoolConfig;
use crate::handle::Slot;
use crate::ledger::BlockLedger;
use crate::pool::BuddyPool;
use crate::raw::{self, Dropper, ARENA_ALIGN};
use crate::stats::PoolStats;

/// Places values of any `'static` type into buddy blocks of one arena.
///
/// Every live value is owned by exactly one [`Slot`]. Values still live
/// when the allocator is dropped are destroyed in creation order before
/// the arena is released.
///
/// The allocator is neither `Send` nor `Sync`: it may hold values of
/// types that are not.
pub struct TypedAllocator {
    id: AllocatorId,
    pool: BuddyPool,
    /// Destructor of every live value, by block, in creation order.
    live: IndexMap<BlockOffset, Dropper>,
    _not_send: PhantomData<*const ()>,
}

impl TypedAllocator {
    /// Validate `config` and reserve a fresh arena.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        Ok(Self {
            id: AllocatorId::next(),
            pool: BuddyPool::new(config)?,
            live: IndexMap::new(),
            _not_send: PhantomData,
        })
    }

    /// Unique id stamped on every slot this allocator creates.
    pub fn id(&self) -> AllocatorId {
        self.id
    }

    /// Move `value` into a freshly allocated block.
    ///
    /// The block is sized for `max(size_of::<T>(), align_of::<T>())`, so
    /// zero-sized values still occupy one smallest block.
    #[allow(unsafe_code)]
    pub fn create<T: 'static>(&mut self, value: T) -> Result<Slot<T>, PoolError> {
        let align = mem::align_of::<T>();
        if align > ARENA_ALIGN {
            return Err(PoolError::UnsupportedAlignment {
                align,
                max: ARENA_ALIGN,
            });
        }
        let offset = self.pool.allocate(mem::size_of::<T>().max(align))?;
        // SAFETY: the ledger just reserved this block for us alone. It spans
        // at least `size_of::<T>()` bytes, and its offset is a multiple of
        // its size, which is at least `align_of::<T>()`, from a base aligned
        // to `ARENA_ALIGN >= align_of::<T>()`.
        unsafe { self.pool.raw_mut().write(offset.0, value) };
        self.live.insert(offset, raw::drop_erased::<T> as Dropper);
        trace!(
            "created {} at {offset}",
            std::any::type_name::<T>()
        );
        Ok(Slot::new(self.id, offset))
    }

    /// Return the value's block to the pool, then run its destructor.
    ///
    /// # Panics
    ///
    /// A panic from `T`'s destructor propagates to the caller. The block
    /// is already back in the pool by then, so it is not leaked.
    #[allow(unsafe_code)]
    pub fn destroy<T: 'static>(&mut self, slot: Slot<T>) -> Result<(), PoolError> {
        let offset = self.release(&slot)?;
        self.pool.deallocate(offset)?;
        // SAFETY: `release` confirmed this allocator created the slot and
        // unregistered it, so a live `T` sits at `offset` and nothing will
        // read it again. The ledger already lists the block as free, but
        // `&mut self` keeps it from being handed out before the drop ends.
        unsafe {
            self.pool
                .raw_mut()
                .drop_at(offset.0, raw::drop_erased::<T>)
        };
        Ok(())
    }

    /// Move the value out of the arena and return its block to the pool.
    #[allow(unsafe_code)]
    pub fn take<T: 'static>(&mut self, slot: Slot<T>) -> Result<T, PoolError> {
        let offset = self.release(&slot)?;
        // SAFETY: as in `destroy`; the value is moved out instead of dropped.
        let value = unsafe { self.pool.raw_mut().read::<T>(offset.0) };
        self.pool.deallocate(offset)?;
        Ok(value)
    }

    fn release<T>(&mut self, slot: &Slot<T>) -> Result<BlockOffset, PoolError> {
        if slot.owner != self.id {
            return Err(PoolError::ForeignSlot);
        }
        self.live
            .shift_remove(&slot.offset)
            .map(|_| slot.offset)
            .ok_or(PoolError::UnknownBlock {
                offset: slot.offset,
            })
    }

    /// Borrow the value behind `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was created by a different allocator.
    #[allow(unsafe_code)]
    pub fn get<T: 'static>(&self, slot: &Slot<T>) -> &T {
        self.assert_owned(slot);
        // SAFETY: this allocator created the slot and slots are consumed by
        // `destroy`/`take`, so the `T` written by `create` is still live.
        unsafe { self.pool.raw().get::<T>(slot.offset.0) }
    }

    /// Mutably borrow the value behind `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` was created by a different allocator.
    #[allow(unsafe_code)]
    pub fn get_mut<T: 'static>(&mut self, slot: &Slot<T>) -> &mut T {
        self.assert_owned(slot);
        // SAFETY: as in `get`; `&mut self` makes the borrow unique.
        unsafe { self.pool.raw_mut().get_mut::<T>(slot.offset.0) }
    }

    fn assert_owned<T>(&self, slot: &Slot<T>) {
        assert!(
            slot.owner == self.id && self.live.contains_key(&slot.offset),
            "{slot} does not belong to allocator {}",
            self.id
        );
    }

    /// Number of values currently alive in the arena.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Block bookkeeping of the underlying pool.
    pub fn ledger(&self) -> &BlockLedger {
        self.pool.ledger()
    }

    /// Allocation counters of the underlying pool.
    pub fn stats(&self) -> &PoolStats {
        self.pool.stats()
    }

    /// The configuration the underlying pool was built with.
    pub fn config(&self) -> &PoolConfig {
        self.pool.config()
    }
}

impl Drop for TypedAllocator {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        if !self.live.is_empty() {
            log::debug!(
                "allocator {} dropping {} leaked values",
                self.id,
                self.live.len()
            );
        }
        for (offset, dropper) in self.live.drain(..) {
            // SAFETY: every registered offset holds a live value whose
            // destructor is `dropper`, and no slot can reach it once the
            // allocator is being dropped.
            unsafe { self.pool.raw_mut().drop_at(offset.0, dropper) };
        }
    }
}
