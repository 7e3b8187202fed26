//! Untyped storage for a fixed number of `T` slots.
//!
//! This module provides `RawBuffer`, a block of uninitialized memory sized for a
//! known number of elements. The buffer separates allocation from object lifetime:
//! it acquires and releases memory, but never constructs or drops the values that
//! may live in its slots. Tracking which slots are occupied is the job of the
//! owning container.
//!
//! # Safety
//!
//! `RawBuffer` is safe to create, move, swap and drop. Every operation that touches
//! slot contents (`write`, `read`, `drop_range`, `relocate`) is `unsafe`, and the
//! caller is responsible for knowing which slots hold live values.

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use advec_common::result::{capacity_overflow, unwrap_alloc};
use advec_common::{Error, Result};

/// An exclusively owned block of uninitialized memory sized for `capacity`
/// elements of type `T`.
///
/// A buffer with zero capacity (or with a zero-sized `T`) owns no allocation and
/// holds a dangling, well-aligned pointer.
///
/// `RawBuffer` is not `Clone`. Ownership is transferred with a regular move or
/// [`RawBuffer::take`], and exchanged with [`RawBuffer::swap`].
pub struct RawBuffer<T> {
    /// Start of the block; dangling when nothing is allocated.
    ptr: NonNull<T>,
    /// Number of `T` slots the block can hold.
    capacity: usize,
    /// The buffer logically owns (the memory for) values of `T`.
    _marker: PhantomData<T>,
}

impl<T> RawBuffer<T> {
    /// Creates an empty buffer with no capacity. Does not allocate.
    #[inline]
    pub const fn new() -> RawBuffer<T> {
        RawBuffer {
            ptr: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates a buffer with room for `capacity` elements.
    ///
    /// A zero `capacity` yields the empty state without touching the allocator.
    ///
    /// # Panics
    ///
    /// Panics if the byte size of the block overflows `isize::MAX`. Allocator
    /// failure is fatal and reported through [`std::alloc::handle_alloc_error`].
    pub fn with_capacity(capacity: usize) -> RawBuffer<T> {
        unwrap_alloc(Self::try_with_capacity(capacity))
    }

    /// Allocates a buffer with room for `capacity` elements, reporting failure
    /// instead of aborting.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::CapacityOverflow` if the byte size of the block cannot be
    /// represented, and `ErrorKind::AllocFailed` if the allocator returned null.
    /// No memory is retained on failure.
    pub fn try_with_capacity(capacity: usize) -> Result<RawBuffer<T>> {
        let layout = Layout::array::<T>(capacity)
            .map_err(|_| capacity_overflow(capacity, mem::size_of::<T>()))?;
        if capacity == 0 {
            return Ok(RawBuffer::new());
        }
        if layout.size() == 0 {
            // Zero-sized elements: every slot shares the dangling address.
            return Ok(RawBuffer {
                ptr: NonNull::dangling(),
                capacity,
                _marker: PhantomData,
            });
        }

        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc(layout) } as *mut T;
        match NonNull::new(ptr) {
            Some(ptr) => Ok(RawBuffer {
                ptr,
                capacity,
                _marker: PhantomData,
            }),
            None => {
                log::debug!(
                    "RawBuffer<{}>: allocation of {} bytes failed",
                    std::any::type_name::<T>(),
                    layout.size()
                );
                Err(Error::alloc_failed(layout.size(), layout.align()))
            }
        }
    }

    /// Returns the number of element slots in the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if the buffer has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
    }

    /// Returns a raw pointer to the first slot.
    ///
    /// The pointer is dangling (but aligned) when the buffer owns no allocation.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a mutable raw pointer to the first slot.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns the address of the slot at `offset`.
    ///
    /// `offset == capacity` is allowed and yields the one-past-the-end address,
    /// which may serve as an insertion point but must never be dereferenced.
    ///
    /// # Panics
    ///
    /// Panics if `offset > capacity`.
    #[inline]
    pub fn slot(&self, offset: usize) -> *mut T {
        assert!(
            offset <= self.capacity,
            "slot offset {offset} out of bounds (capacity {})",
            self.capacity
        );
        // SAFETY: `offset` is within the allocation or one past its end.
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Moves `value` into the slot at `offset`.
    ///
    /// # Safety
    ///
    /// `offset` must be less than the capacity, and the slot must not hold a live
    /// value (it would be overwritten without being dropped).
    #[inline]
    pub unsafe fn write(&mut self, offset: usize, value: T) {
        debug_assert!(offset < self.capacity);
        unsafe { ptr::write(self.ptr.as_ptr().add(offset), value) }
    }

    /// Moves the value out of the slot at `offset`, leaving the slot logically
    /// uninitialized.
    ///
    /// # Safety
    ///
    /// `offset` must be less than the capacity and the slot must hold a live value.
    /// The caller must not read or drop that slot again.
    #[inline]
    pub unsafe fn read(&self, offset: usize) -> T {
        debug_assert!(offset < self.capacity);
        unsafe { ptr::read(self.ptr.as_ptr().add(offset)) }
    }

    /// Drops `count` live values starting at slot `start`.
    ///
    /// # Safety
    ///
    /// `start + count` must not exceed the capacity and every slot in the range
    /// must hold a live value. Afterwards the slots are uninitialized.
    #[inline]
    pub unsafe fn drop_range(&mut self, start: usize, count: usize) {
        debug_assert!(start + count <= self.capacity);
        unsafe {
            let first = self.ptr.as_ptr().add(start);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, count));
        }
    }

    /// Transfers `count` values from `src` to `dst`.
    ///
    /// Rust moves are plain bitwise relocations and cannot fail, so the transfer
    /// never has to fall back to cloning: the source slots simply become
    /// uninitialized.
    ///
    /// # Safety
    ///
    /// `src` must point to `count` live values, `dst` must be valid for `count`
    /// writes, and the two ranges must not overlap. The caller must treat the
    /// source slots as uninitialized afterwards.
    #[inline]
    pub unsafe fn relocate(src: *const T, count: usize, dst: *mut T) {
        unsafe { ptr::copy_nonoverlapping(src, dst, count) }
    }

    /// Exchanges the blocks (and capacities) of two buffers. Never allocates or fails.
    #[inline]
    pub fn swap(&mut self, other: &mut RawBuffer<T>) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Transfers ownership of the block to the returned buffer, leaving `self`
    /// in the empty state.
    #[inline]
    pub fn take(&mut self) -> RawBuffer<T> {
        mem::take(self)
    }

    /// Layout of the block currently owned by this buffer.
    fn current_layout(&self) -> Layout {
        // SAFETY: the same layout was validated by `Layout::array` when the block
        // was allocated.
        unsafe {
            Layout::from_size_align_unchecked(
                mem::size_of::<T>() * self.capacity,
                mem::align_of::<T>(),
            )
        }
    }
}

impl<T> Default for RawBuffer<T> {
    fn default() -> Self {
        RawBuffer::new()
    }
}

impl<T> Drop for RawBuffer<T> {
    /// Releases the block. Values still occupying slots are *not* dropped; the
    /// owner must have disposed of them already.
    fn drop(&mut self) {
        if self.capacity != 0 && mem::size_of::<T>() != 0 {
            // SAFETY: the block was allocated in `try_with_capacity` with exactly
            // this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr() as *mut u8, self.current_layout()) };
        }
    }
}

// SAFETY: RawBuffer owns its block exclusively, so sending it is as safe as sending
// the `T` values it may hold.
unsafe impl<T: Send> Send for RawBuffer<T> {}

// SAFETY: shared access only hands out raw pointers; reading through them is
// governed by the owner, which requires `T: Sync` for shared references.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> std::fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}
