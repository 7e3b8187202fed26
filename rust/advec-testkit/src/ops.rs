//! Seeded random operation scripts for model-based container tests.

/// A single mutation applied both to the container under test and to a reference
/// `Vec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Push(i64),
    /// Insert at `index % (len + 1)`.
    Insert { index: usize, value: i64 },
    /// Remove at `index % len`; no-op when empty.
    Remove { index: usize },
    Pop,
    Resize(usize),
    Truncate(usize),
    Reserve(usize),
    /// Replace the contents with a copy of `values`.
    Assign(Vec<i64>),
    Clear,
}

/// Generates `count` operations from `seed`.
///
/// Sizes stay below `max_len` so scripts exercise both the in-place and the
/// reallocating paths without growing unboundedly.
pub fn random_ops(seed: u64, count: usize, max_len: usize) -> Vec<Op> {
    assert_ne!(max_len, 0);
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..count)
        .map(|_| match rng.u8(0..20) {
            0..=5 => Op::Push(rng.i64(-1000..1000)),
            6..=9 => Op::Insert {
                index: rng.usize(..),
                value: rng.i64(-1000..1000),
            },
            10..=12 => Op::Remove {
                index: rng.usize(..),
            },
            13 => Op::Pop,
            14 => Op::Resize(rng.usize(0..max_len)),
            15 => Op::Truncate(rng.usize(0..max_len)),
            16 => Op::Reserve(rng.usize(0..max_len * 2)),
            17 | 18 => {
                let len = rng.usize(0..max_len);
                Op::Assign((0..len).map(|_| rng.i64(-1000..1000)).collect())
            }
            _ => Op::Clear,
        })
        .collect()
}
