//! A contiguous growable array with explicit control over object lifetime.
//!
//! [`DynamicArray`] keeps its elements in a [`RawBuffer`](advec_raw_buffer::RawBuffer),
//! a block of uninitialized memory that is allocated and released independently of
//! the values stored in it. The array constructs and drops the values itself, which
//! lets every growing operation follow the same pattern:
//!
//! 1. build the new element(s) first,
//! 2. allocate a new buffer if needed and relocate the existing elements into it,
//! 3. swap buffers (the commit point).
//!
//! A panic raised by element code (`Default`, `Clone`, or a user closure) in step 1
//! leaves the array exactly as it was, with no leaked or doubly dropped values.
//! Relocation in step 2 is a bitwise move and cannot fail.
//!
//! Allocation failure is fatal for the plain operations (`push`, `insert`,
//! `reserve`, ...) and reported as an [`Error`] by their `try_*` counterparts,
//! which also surface failures of fallible element factories.

mod dynamic_array;
mod guard;
mod into_iter;

pub use advec_common::{Error, ErrorKind, Result};
pub use dynamic_array::DynamicArray;
pub use into_iter::IntoIter;

#[cfg(test)]
mod tests;
