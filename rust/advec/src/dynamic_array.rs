//! A contiguous, growable array built on top of [`RawBuffer`].

use std::borrow::{Borrow, BorrowMut};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::{fmt, ptr, slice};

use advec_common::result::{capacity_overflow, unwrap_alloc};
use advec_common::{Error, Result};
use advec_raw_buffer::RawBuffer;

use crate::guard::InitGuard;
use crate::into_iter::IntoIter;

/// A contiguous growable array owning zero or more values of type `T`.
///
/// Slots `[0, len)` of the underlying [`RawBuffer`] always hold live values in
/// order, slots `[len, capacity)` are uninitialized. Capacity only grows, except
/// when the whole state is replaced (assignment, [`swap_with`](Self::swap_with),
/// [`std::mem::take`]).
///
/// Every operation that builds new elements leaves the array exactly as it was
/// if element construction panics (or, for the `try_*` variants, returns an
/// error): appending, inserting and growing all construct the new value before
/// any existing element is touched, and commit by swapping buffers.
///
/// # Examples
///
/// ```
/// use advec::DynamicArray;
///
/// let mut a = DynamicArray::new();
/// a.emplace_back(|| 1);
/// a.emplace_back(|| 2);
/// a.emplace_back(|| 3);
/// assert_eq!((a.len(), a.capacity()), (3, 4));
///
/// a.insert(1, 99);
/// assert_eq!(a, [1, 99, 2, 3]);
///
/// a.remove(0);
/// assert_eq!(a, [99, 2, 3]);
/// ```
pub struct DynamicArray<T> {
    /// Storage; owns the memory but not the values.
    buf: RawBuffer<T>,
    /// Number of live values at the front of `buf`.
    len: usize,
}

impl<T> DynamicArray<T> {
    /// Factor applied to the length when a full array has to grow.
    pub const GROWTH_FACTOR: usize = 2;
    /// Capacity of the first allocation made by a growing empty array.
    pub const MIN_NON_ZERO_CAPACITY: usize = 1;

    /// Creates an empty array. Does not allocate.
    #[inline]
    pub const fn new() -> DynamicArray<T> {
        DynamicArray {
            buf: RawBuffer::new(),
            len: 0,
        }
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> DynamicArray<T> {
        DynamicArray {
            buf: RawBuffer::with_capacity(capacity),
            len: 0,
        }
    }

    /// Creates an array of `len` default values. The capacity equals `len`.
    ///
    /// If a `T::default()` call panics, the values built so far are dropped and
    /// the memory is released before the panic propagates.
    pub fn with_len(len: usize) -> DynamicArray<T>
    where
        T: Default,
    {
        Self::from_fn(len, |_| T::default())
    }

    /// Creates an array of `len` values, the `i`-th produced by `f(i)`.
    pub fn from_fn<F>(len: usize, mut f: F) -> DynamicArray<T>
    where
        F: FnMut(usize) -> T,
    {
        let mut buf = RawBuffer::with_capacity(len);
        let mut guard = InitGuard::new(buf.as_mut_ptr());
        for i in 0..len {
            // SAFETY: `buf` has `len` uninitialized slots and `i < len`.
            unsafe { guard.push(f(i)) };
        }
        let len = guard.disarm();
        DynamicArray { buf, len }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the array can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns a raw pointer to the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a mutable raw pointer to the first element.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Returns a slice containing the entire array.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Returns a mutable slice containing the entire array.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Returns a reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`. Debug builds assert this.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len, "index {index} out of range");
        unsafe { &*self.buf.as_ptr().add(index) }
    }

    /// Returns a mutable reference to the element at `index` without bounds
    /// checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`. Debug builds assert this.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len, "index {index} out of range");
        unsafe { &mut *self.buf.as_mut_ptr().add(index) }
    }

    /// Ensures the capacity is at least `new_capacity`.
    ///
    /// Unlike `Vec::reserve`, the argument is the total capacity, not the number of
    /// additional elements. Does nothing if the capacity already suffices;
    /// otherwise allocates exactly `new_capacity` slots and relocates the elements.
    pub fn reserve(&mut self, new_capacity: usize) {
        unwrap_alloc(self.try_reserve(new_capacity))
    }

    /// Fallible version of [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// Returns an allocation error if the new block cannot be obtained; the array is
    /// left untouched.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let new_buf = RawBuffer::try_with_capacity(new_capacity)?;
        self.relocate_into(new_buf);
        Ok(())
    }

    /// Resizes the array to `new_len`, dropping excess elements or appending
    /// `T::default()` values.
    ///
    /// If a default constructor panics while growing, the values appended so far
    /// are dropped and the length is restored. The capacity may already have grown.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Resizes the array to `new_len`, filling new slots with values returned by `f`.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
        } else {
            self.reserve(new_len);
            self.append_within_capacity(new_len - self.len, |_| f());
        }
    }

    /// Shortens the array to `len` elements, dropping the rest. Has no effect if
    /// `len` is not smaller than the current length.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let tail = self.len - len;
        self.len = len;
        // SAFETY: slots `[len, len + tail)` were live and are no longer counted.
        unsafe { self.buf.drop_range(len, tail) };
    }

    /// Drops all elements, keeping the capacity.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Appends `value`, growing the capacity if the array is full, and returns a
    /// reference to the new element.
    pub fn push(&mut self, value: T) -> &mut T {
        unwrap_alloc(self.try_push(value))
    }

    /// Fallible version of [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// Returns an allocation error if the array had to grow and could not; the
    /// array is unchanged and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<&mut T> {
        self.insert_value(self.len, value)
    }

    /// Constructs a new element with `f` and appends it.
    ///
    /// The element is built before anything else happens, so a panic in `f` leaves
    /// the array untouched.
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let value = f();
        self.push(value)
    }

    /// Constructs a new element with the fallible factory `f` and appends it.
    ///
    /// # Errors
    ///
    /// Returns an element error wrapping the factory's error, or an allocation
    /// error. In both cases the array is unchanged.
    pub fn try_emplace_back<F, E>(&mut self, f: F) -> Result<&mut T>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let value = f().map_err(|e| Error::element("emplace_back", e))?;
        self.try_push(value)
    }

    /// Removes the last element and returns it, or `None` if the array is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was live and is no longer counted.
        Some(unsafe { self.buf.read(self.len) })
    }

    /// Inserts `value` at `index`, shifting all following elements to the right,
    /// and returns a reference to it.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.check_insert_index(index);
        unwrap_alloc(self.insert_value(index, value))
    }

    /// Constructs a new element with `f` and inserts it at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`; `f` is not called in that case.
    pub fn emplace<F>(&mut self, index: usize, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.check_insert_index(index);
        let value = f();
        unwrap_alloc(self.insert_value(index, value))
    }

    /// Constructs a new element with the fallible factory `f` and inserts it at
    /// `index`.
    ///
    /// # Errors
    ///
    /// Returns an element error wrapping the factory's error, or an allocation
    /// error. In both cases the array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn try_emplace<F, E>(&mut self, index: usize, f: F) -> Result<&mut T>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.check_insert_index(index);
        let value = f().map_err(|e| Error::element("emplace", e))?;
        self.insert_value(index, value)
    }

    /// Removes and returns the element at `index`, shifting all following elements
    /// to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "removal index (is {index}) should be < len (is {})",
            self.len
        );
        // SAFETY: `index` is a live slot; the elements after it are moved down by
        // one and the last slot stops being counted.
        unsafe {
            let p = self.buf.slot(index);
            let value = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Exchanges the contents of two arrays in O(1).
    pub fn swap_with(&mut self, other: &mut DynamicArray<T>) {
        self.buf.swap(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Appends clones of all elements of `values`.
    pub fn extend_from_slice(&mut self, values: &[T])
    where
        T: Clone,
    {
        self.reserve_for(values.len());
        self.append_within_capacity(values.len(), |i| values[i].clone());
    }

    /// Moves the elements into a `Vec`.
    pub fn into_vec(self) -> Vec<T> {
        self.into_iter().collect()
    }

    /// Returns the elements as raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8]
    where
        T: bytemuck::NoUninit,
    {
        bytemuck::cast_slice(self.as_slice())
    }
}

impl<T> DynamicArray<T> {
    /// Places an already constructed `value` at `index` (`index <= len`).
    ///
    /// With spare capacity the tail is shifted right by one slot and the value is
    /// written into the gap. When full, a buffer of `max(1, 2 * len)` slots is
    /// allocated, the value is written at `index`, the prefix and the suffix are
    /// relocated around it, and the buffers are swapped. Nothing observable changes
    /// before that swap.
    fn insert_value(&mut self, index: usize, value: T) -> Result<&mut T> {
        debug_assert!(index <= self.len);
        if self.len == self.capacity() {
            let mut new_buf = RawBuffer::try_with_capacity(self.grown_capacity()?)?;
            // SAFETY: the new buffer has at least `len + 1` slots; the old slots
            // are treated as uninitialized once relocated.
            unsafe {
                new_buf.write(index, value);
                RawBuffer::relocate(self.buf.as_ptr(), index, new_buf.slot(0));
                RawBuffer::relocate(
                    self.buf.slot(index),
                    self.len - index,
                    new_buf.slot(index + 1),
                );
            }
            log::trace!(
                "DynamicArray<{}>: grew from {} to {} slots inserting at {}",
                std::any::type_name::<T>(),
                self.capacity(),
                new_buf.capacity(),
                index
            );
            self.buf.swap(&mut new_buf);
        } else {
            // SAFETY: there is at least one free slot past `len`, so shifting
            // `[index, len)` right by one stays in bounds.
            unsafe {
                let p = self.buf.slot(index);
                if index < self.len {
                    ptr::copy(p, p.add(1), self.len - index);
                }
                ptr::write(p, value);
            }
        }
        self.len += 1;
        // SAFETY: `index` is now a live slot.
        Ok(unsafe { &mut *self.buf.slot(index) })
    }

    /// Relocates all elements into `new_buf` and makes it the array's storage.
    fn relocate_into(&mut self, mut new_buf: RawBuffer<T>) {
        debug_assert!(new_buf.capacity() >= self.len);
        log::trace!(
            "DynamicArray<{}>: relocating {} elements, capacity {} -> {}",
            std::any::type_name::<T>(),
            self.len,
            self.capacity(),
            new_buf.capacity()
        );
        // SAFETY: the first `len` slots are live and `new_buf` has room for them;
        // after the swap the old block only holds moved-from slots.
        unsafe { RawBuffer::relocate(self.buf.as_ptr(), self.len, new_buf.as_mut_ptr()) };
        self.buf.swap(&mut new_buf);
    }

    /// Constructs `count` new elements past the end with `f(0..count)`.
    ///
    /// The capacity must already suffice. If `f` panics, the values built so far
    /// are dropped and the length is unchanged.
    fn append_within_capacity<F>(&mut self, count: usize, mut f: F)
    where
        F: FnMut(usize) -> T,
    {
        debug_assert!(self.len + count <= self.capacity());
        let mut guard = InitGuard::new(self.buf.slot(self.len));
        for i in 0..count {
            // SAFETY: slots `[len, len + count)` are free.
            unsafe { guard.push(f(i)) };
        }
        self.len += guard.disarm();
    }

    /// Capacity to use when a full array must grow: `max(1, 2 * len)`.
    fn grown_capacity(&self) -> Result<usize> {
        if self.len == 0 {
            return Ok(Self::MIN_NON_ZERO_CAPACITY);
        }
        self.len
            .checked_mul(Self::GROWTH_FACTOR)
            .ok_or_else(|| capacity_overflow(self.len, mem::size_of::<T>()))
    }

    /// Makes room for `additional` more elements, growing geometrically so that
    /// repeated bulk appends stay amortized O(1) per element.
    fn reserve_for(&mut self, additional: usize) {
        let required = self
            .len
            .checked_add(additional)
            .ok_or_else(|| capacity_overflow(additional, mem::size_of::<T>()));
        let required = unwrap_alloc(required);
        if required > self.capacity() {
            let grown = unwrap_alloc(self.grown_capacity());
            self.reserve(required.max(grown));
        }
    }

    #[inline]
    fn check_insert_index(&self, index: usize) {
        assert!(
            index <= self.len,
            "insertion index (is {index}) should be <= len (is {})",
            self.len
        );
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        let len = mem::replace(&mut self.len, 0);
        // SAFETY: the first `len` slots are live; the buffer releases the memory.
        unsafe { self.buf.drop_range(0, len) };
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Deep copy with capacity equal to the source length.
    fn clone(&self) -> Self {
        let src = self.as_slice();
        DynamicArray::from_fn(src.len(), |i| src[i].clone())
    }

    /// Copy-assignment.
    ///
    /// A source longer than this array's capacity is cloned in full and swapped in
    /// (either all of it succeeds or `self` is untouched). Otherwise the buffer is
    /// reused: the common prefix is assigned element-wise with `clone_from`, then
    /// the excess tail is dropped or the missing suffix is cloned in.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap_with(&mut copy);
            return;
        }

        let common = self.len.min(source.len);
        for (dst, src) in self.as_mut_slice()[..common]
            .iter_mut()
            .zip(&source.as_slice()[..common])
        {
            dst.clone_from(src);
        }

        if source.len < self.len {
            self.truncate(source.len);
        } else {
            let suffix = &source.as_slice()[self.len..];
            self.append_within_capacity(suffix.len(), |i| suffix[i].clone());
        }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        DynamicArray::new()
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Index<usize> for DynamicArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        debug_assert!(
            index < self.len,
            "index {index} out of range for DynamicArray of length {}",
            self.len
        );
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for DynamicArray<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(
            index < self.len,
            "index {index} out of range for DynamicArray of length {}",
            self.len
        );
        &mut self.as_mut_slice()[index]
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Borrow<[T]> for DynamicArray<T> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> BorrowMut<[T]> for DynamicArray<T> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynamicArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T: PartialEq> PartialEq<[T]> for DynamicArray<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for DynamicArray<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialOrd> PartialOrd for DynamicArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for DynamicArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for DynamicArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve_for(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = DynamicArray::new();
        array.extend(iter);
        array
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let mut this = ManuallyDrop::new(self);
        let len = this.len;
        IntoIter::new(this.buf.take(), len)
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    fn from(vec: Vec<T>) -> Self {
        vec.into_iter().collect()
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(slice: &[T]) -> Self {
        DynamicArray::from_fn(slice.len(), |i| slice[i].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let a = DynamicArray::<String>::new();
        assert!(a.is_empty());
        assert_eq!(a.len(), 0);
        assert_eq!(a.capacity(), 0);
        assert_eq!(a.as_slice(), &[] as &[String]);
    }

    #[test]
    fn test_with_capacity() {
        let a = DynamicArray::<u8>::with_capacity(10);
        assert_eq!(a.len(), 0);
        assert_eq!(a.capacity(), 10);
    }

    #[test]
    fn test_grown_capacity() {
        let mut a = DynamicArray::<u32>::new();
        assert_eq!(a.grown_capacity().unwrap(), 1);
        a.push(1);
        assert_eq!(a.grown_capacity().unwrap(), 2);
        a.extend_from_slice(&[2, 3]);
        assert_eq!(a.grown_capacity().unwrap(), 6);
    }

    #[test]
    fn test_as_bytes() {
        let a: DynamicArray<u16> = [0x0102u16, 0x0304].into_iter().collect();
        let bytes = a.as_bytes();
        assert_eq!(bytes.len(), 4);
        assert_eq!(bytes, bytemuck::cast_slice::<u16, u8>(&[0x0102, 0x0304]));
    }

    #[test]
    #[should_panic(expected = "insertion index (is 3) should be <= len (is 2)")]
    fn test_insert_past_end_panics() {
        let mut a = DynamicArray::from(vec![1, 2]);
        a.insert(3, 0);
    }

    #[test]
    #[should_panic(expected = "insertion index (is 1) should be <= len (is 0)")]
    fn test_emplace_past_end_does_not_construct() {
        let mut a = DynamicArray::<String>::new();
        a.emplace(1, || unreachable!());
    }

    #[test]
    #[should_panic(expected = "removal index (is 2) should be < len (is 2)")]
    fn test_remove_past_end_panics() {
        let mut a = DynamicArray::from(vec![1, 2]);
        a.remove(2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    #[cfg(debug_assertions)]
    fn test_index_past_end_asserts() {
        let a = DynamicArray::from(vec![1, 2]);
        let _ = a[2];
    }
}
