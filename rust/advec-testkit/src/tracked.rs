//! Instrumented element types.
//!
//! [`Tracked`] values report every construction, clone and drop to thread-local
//! counters, so a test can assert that a container neither leaked nor dropped a
//! value twice. A construction budget can be armed with [`fail_after`]; once it is
//! exhausted the next construction (via `new`, `Default` or `Clone`) panics, which
//! models an element constructor that throws.
//!
//! The counters are per thread, and the test harness runs every test on its own
//! thread, so tests do not interfere with each other.

use std::cell::Cell;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static CONSTRUCTED: Cell<usize> = const { Cell::new(0) };
    static DROPPED: Cell<usize> = const { Cell::new(0) };
    static BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Message of the panic raised when the construction budget is exhausted.
pub const INJECTED_FAILURE: &str = "injected construction failure";

/// Resets all counters and disarms the construction budget.
pub fn reset() {
    LIVE.set(0);
    CONSTRUCTED.set(0);
    DROPPED.set(0);
    BUDGET.set(None);
}

/// Number of `Tracked` values currently alive on this thread.
///
/// Negative values mean some value was dropped more than once.
pub fn live() -> isize {
    LIVE.get()
}

/// Total number of successful constructions (including clones).
pub fn constructed() -> usize {
    CONSTRUCTED.get()
}

/// Total number of drops.
pub fn dropped() -> usize {
    DROPPED.get()
}

/// Allows `n` more constructions to succeed; the one after them panics.
pub fn fail_after(n: usize) {
    BUDGET.set(Some(n));
}

/// Disarms the construction budget.
pub fn never_fail() {
    BUDGET.set(None);
}

/// Consumes one unit of the construction budget, panicking when it is exhausted.
fn on_construct() {
    if let Some(remaining) = BUDGET.get() {
        if remaining == 0 {
            panic!("{INJECTED_FAILURE}");
        }
        BUDGET.set(Some(remaining - 1));
    }
    CONSTRUCTED.set(CONSTRUCTED.get() + 1);
    LIVE.set(LIVE.get() + 1);
}

/// An integer payload whose lifetime is reported to the thread-local counters.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tracked {
    value: i64,
}

impl Tracked {
    /// Constructs a value, honoring the construction budget.
    pub fn new(value: i64) -> Tracked {
        on_construct();
        Tracked { value }
    }

    /// Returns the payload.
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl Default for Tracked {
    fn default() -> Self {
        Tracked::new(0)
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Tracked::new(self.value)
    }

    fn clone_from(&mut self, source: &Self) {
        // Assignment does not create a new object.
        self.value = source.value;
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        LIVE.set(LIVE.get() - 1);
        DROPPED.set(DROPPED.get() + 1);
    }
}

/// Error returned by [`FallibleFactory`] when a construction is refused.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("construction of element {value} refused")]
pub struct ConstructError {
    pub value: i64,
}

/// Produces `Tracked` values through a `Result`, refusing the values listed in
/// `rejected`.
#[derive(Debug, Default, Clone)]
pub struct FallibleFactory {
    rejected: Vec<i64>,
}

impl FallibleFactory {
    pub fn rejecting(rejected: impl IntoIterator<Item = i64>) -> FallibleFactory {
        FallibleFactory {
            rejected: rejected.into_iter().collect(),
        }
    }

    pub fn make(&self, value: i64) -> Result<Tracked, ConstructError> {
        if self.rejected.contains(&value) {
            Err(ConstructError { value })
        } else {
            Ok(Tracked::new(value))
        }
    }
}

/// Collects the payloads of a slice of `Tracked` values.
pub fn values(items: &[Tracked]) -> Vec<i64> {
    items.iter().map(Tracked::value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        reset();
        let a = Tracked::new(1);
        let b = a.clone();
        assert_eq!(live(), 2);
        assert_eq!(constructed(), 2);
        drop(a);
        drop(b);
        assert_eq!(live(), 0);
        assert_eq!(dropped(), 2);
    }

    #[test]
    fn test_budget() {
        reset();
        fail_after(1);
        let a = Tracked::new(1);
        let res = std::panic::catch_unwind(|| Tracked::new(2));
        assert!(res.is_err());
        assert_eq!(live(), 1);
        never_fail();
        let _b = a.clone();
        assert_eq!(live(), 2);
    }

    #[test]
    fn test_fallible_factory() {
        reset();
        let factory = FallibleFactory::rejecting([3]);
        assert_eq!(factory.make(1).unwrap().value(), 1);
        assert_eq!(factory.make(3).unwrap_err(), ConstructError { value: 3 });
        assert_eq!(live(), 0);
    }
}
