//! Low-level primitives for arena memory operations.
//!
//! This is the only module in the crate that owns a raw allocation. Every
//! `unsafe` function carries a `# Safety` contract, and every call site
//! outside this module carries a `// SAFETY:` comment explaining why the
//! contract holds.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};
use std::slice;

use twin_core::PoolError;

/// Alignment of the arena base address.
///
/// Block offsets are multiples of the block size, so any block is aligned
/// to `min(block size, ARENA_ALIGN)`.
pub const ARENA_ALIGN: usize = 4096;

/// Type-erased destructor for a value stored in the arena.
pub(crate) type Dropper = unsafe fn(*mut u8);

/// Run the destructor of a `T` stored at `ptr`.
///
/// # Safety
///
/// `ptr` must point to a live, initialised `T` that is never used again.
pub(crate) unsafe fn drop_erased<T>(ptr: *mut u8) {
    ptr::drop_in_place(ptr.cast::<T>());
}

/// One zero-initialised, fixed-size reservation of bytes.
pub(crate) struct RawArena {
    base: NonNull<u8>,
    layout: Layout,
}

// SAFETY: the arena exclusively owns its reservation and hands out
// references only through `&self`/`&mut self`, so moving it between
// threads or sharing `&RawArena` is no different from a `Box<[u8]>`.
unsafe impl Send for RawArena {}
unsafe impl Sync for RawArena {}

impl RawArena {
    /// Reserve `bytes` zeroed bytes aligned to [`ARENA_ALIGN`].
    pub(crate) fn new(bytes: usize) -> Result<Self, PoolError> {
        let layout = Layout::from_size_align(bytes.max(1), ARENA_ALIGN)
            .map_err(|_| PoolError::ReservationFailed { bytes })?;
        // SAFETY: the layout has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let base = NonNull::new(ptr).ok_or(PoolError::ReservationFailed { bytes })?;
        Ok(Self { base, layout })
    }

    /// Size of the reservation in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    fn ptr_at(&self, offset: usize, len: usize) -> *mut u8 {
        let end = offset.checked_add(len);
        assert!(
            end.is_some_and(|end| end <= self.len()),
            "range {offset}+{len} outside arena of {} bytes",
            self.len()
        );
        // SAFETY: `offset <= len()`, so the result stays inside (or one
        // past the end of) the reservation.
        unsafe { self.base.as_ptr().add(offset) }
    }

    /// Shared view of `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the reservation.
    pub(crate) fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        let ptr = self.ptr_at(offset, len);
        // SAFETY: the range is in bounds; byte views are only handed out
        // by `BuddyPool`, whose memory is zeroed at reservation and only
        // ever written as bytes, so every byte is initialised.
        unsafe { slice::from_raw_parts(ptr, len) }
    }

    /// Mutable view of `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the reservation.
    pub(crate) fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        let ptr = self.ptr_at(offset, len);
        // SAFETY: as for `bytes`; `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(ptr, len) }
    }

    /// Move `value` into the arena at `offset`.
    ///
    /// # Safety
    ///
    /// The range `offset..offset + size_of::<T>()` must be reserved for
    /// this value alone, must not currently hold a live value, and must be
    /// aligned for `T`.
    pub(crate) unsafe fn write<T>(&mut self, offset: usize, value: T) {
        let ptr = self.ptr_at(offset, std::mem::size_of::<T>());
        ptr.cast::<T>().write(value);
    }

    /// Borrow the `T` stored at `offset`.
    ///
    /// # Safety
    ///
    /// A live `T` must have been written at `offset` with [`write`](Self::write).
    pub(crate) unsafe fn get<T>(&self, offset: usize) -> &T {
        &*self.ptr_at(offset, std::mem::size_of::<T>()).cast::<T>()
    }

    /// Mutably borrow the `T` stored at `offset`.
    ///
    /// # Safety
    ///
    /// As for [`get`](Self::get).
    pub(crate) unsafe fn get_mut<T>(&mut self, offset: usize) -> &mut T {
        &mut *self.ptr_at(offset, std::mem::size_of::<T>()).cast::<T>()
    }

    /// Move the `T` stored at `offset` out of the arena.
    ///
    /// # Safety
    ///
    /// As for [`get`](Self::get); afterwards the storage holds no live
    /// value and must not be read as a `T` again.
    pub(crate) unsafe fn read<T>(&mut self, offset: usize) -> T {
        self.ptr_at(offset, std::mem::size_of::<T>())
            .cast::<T>()
            .read()
    }

    /// Run a type-erased destructor on the value at `offset`.
    ///
    /// # Safety
    ///
    /// `dropper` must be `drop_erased::<T>` for the type of the live value
    /// at `offset`; afterwards the storage holds no live value.
    pub(crate) unsafe fn drop_at(&mut self, offset: usize, dropper: Dropper) {
        dropper(self.ptr_at(offset, 0));
    }
}

impl Drop for RawArena {
    fn drop(&mut self) {
        // SAFETY: `base` was returned by `alloc_zeroed` with this layout
        // and is released exactly once.
        unsafe { alloc::dealloc(self.base.as_ptr(), self.layout) };
    }
}
