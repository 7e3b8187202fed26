use std::{mem, ptr};

/// Tracks a run of freshly written slots and drops them if it goes out of scope
/// before being disarmed.
///
/// Every path that constructs several elements into uninitialized memory writes
/// through an `InitGuard`, so a panic from an element constructor destroys exactly
/// the values built so far and nothing else.
pub(crate) struct InitGuard<T> {
    dst: *mut T,
    count: usize,
}

impl<T> InitGuard<T> {
    #[inline]
    pub(crate) fn new(dst: *mut T) -> InitGuard<T> {
        InitGuard { dst, count: 0 }
    }

    /// Writes `value` into the next slot of the run.
    ///
    /// # Safety
    ///
    /// The slot at `dst + count` must be valid for writes and uninitialized.
    #[inline]
    pub(crate) unsafe fn push(&mut self, value: T) {
        unsafe { ptr::write(self.dst.add(self.count), value) };
        self.count += 1;
    }

    /// Releases ownership of the written values and returns their count.
    #[inline]
    pub(crate) fn disarm(self) -> usize {
        let count = self.count;
        mem::forget(self);
        count
    }
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        // SAFETY: exactly `count` slots starting at `dst` were initialized by `push`.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.dst, self.count)) }
    }
}
