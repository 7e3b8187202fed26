use std::iter::FusedIterator;
use std::{fmt, slice};

use advec_raw_buffer::RawBuffer;

/// An owning iterator over the elements of a [`DynamicArray`](crate::DynamicArray).
///
/// Keeps the array's buffer alive while yielding; elements that were not consumed
/// are dropped together with the iterator.
pub struct IntoIter<T> {
    buf: RawBuffer<T>,
    /// Index of the next element yielded from the front.
    start: usize,
    /// One past the index of the next element yielded from the back.
    end: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(buf: RawBuffer<T>, len: usize) -> IntoIter<T> {
        debug_assert!(len <= buf.capacity());
        IntoIter {
            buf,
            start: 0,
            end: len,
        }
    }

    /// Returns the elements that have not been yielded yet.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[start, end)` are live.
        unsafe { slice::from_raw_parts(self.buf.slot(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start` is live and is excluded from the range right after.
        let value = unsafe { self.buf.read(self.start) };
        self.start += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the old `end - 1` was live and is excluded from the range now.
        Some(unsafe { self.buf.read(self.end) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let (start, count) = (self.start, self.end - self.start);
        self.start = self.end;
        // SAFETY: slots `[start, start + count)` still hold un-yielded values.
        unsafe { self.buf.drop_range(start, count) };
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
