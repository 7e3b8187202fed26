//! Random operation scripts run against `DynamicArray` and a `Vec` reference model.

use advec_testkit::ops::{Op, random_ops};
use advec_testkit::tracked::{self, Tracked, values};

use crate::DynamicArray;

fn apply_model(model: &mut Vec<i64>, op: &Op) {
    match op {
        Op::Push(v) => model.push(*v),
        Op::Insert { index, value } => {
            let index = index % (model.len() + 1);
            model.insert(index, *value);
        }
        Op::Remove { index } => {
            if !model.is_empty() {
                let index = index % model.len();
                model.remove(index);
            }
        }
        Op::Pop => {
            model.pop();
        }
        Op::Resize(n) => model.resize(*n, 0),
        Op::Truncate(n) => model.truncate(*n),
        Op::Reserve(_) => {}
        Op::Assign(values) => model.clone_from(values),
        Op::Clear => model.clear(),
    }
}

fn apply_array(array: &mut DynamicArray<i64>, op: &Op) {
    match op {
        Op::Push(v) => {
            array.push(*v);
        }
        Op::Insert { index, value } => {
            let index = index % (array.len() + 1);
            array.insert(index, *value);
        }
        Op::Remove { index } => {
            if !array.is_empty() {
                let index = index % array.len();
                array.remove(index);
            }
        }
        Op::Pop => {
            array.pop();
        }
        Op::Resize(n) => array.resize(*n),
        Op::Truncate(n) => array.truncate(*n),
        Op::Reserve(n) => array.reserve(*n),
        Op::Assign(values) => array.clone_from(&DynamicArray::from(values.as_slice())),
        Op::Clear => array.clear(),
    }
}

fn apply_tracked(array: &mut DynamicArray<Tracked>, op: &Op) {
    match op {
        Op::Push(v) => {
            array.emplace_back(|| Tracked::new(*v));
        }
        Op::Insert { index, value } => {
            let index = index % (array.len() + 1);
            array.emplace(index, || Tracked::new(*value));
        }
        Op::Remove { index } => {
            if !array.is_empty() {
                let index = index % array.len();
                array.remove(index);
            }
        }
        Op::Pop => {
            array.pop();
        }
        Op::Resize(n) => array.resize(*n),
        Op::Truncate(n) => array.truncate(*n),
        Op::Reserve(n) => array.reserve(*n),
        Op::Assign(values) => {
            let source = DynamicArray::from_fn(values.len(), |i| Tracked::new(values[i]));
            array.clone_from(&source);
        }
        Op::Clear => array.clear(),
    }
}

#[test]
fn test_matches_vec_model() {
    for seed in 0..32 {
        let mut model = Vec::new();
        let mut array = DynamicArray::new();
        for (step, op) in random_ops(seed, 400, 24).iter().enumerate() {
            let capacity_before = array.capacity();
            apply_model(&mut model, op);
            apply_array(&mut array, op);

            assert_eq!(array.as_slice(), model.as_slice(), "seed {seed}, step {step}: {op:?}");
            assert!(array.len() <= array.capacity());
            assert!(array.capacity() >= capacity_before, "capacity shrank on {op:?}");
        }
    }
}

#[test]
fn test_tracked_model_has_no_leaks() {
    for seed in 100..116 {
        tracked::reset();
        let mut model = Vec::new();
        let mut array = DynamicArray::new();
        for op in random_ops(seed, 300, 16) {
            apply_model(&mut model, &op);
            apply_tracked(&mut array, &op);
            assert_eq!(values(&array), model, "seed {seed}: {op:?}");
            assert_eq!(tracked::live(), array.len() as isize, "seed {seed}: {op:?}");
        }
        drop(array);
        assert_eq!(tracked::live(), 0);
        assert_eq!(tracked::constructed(), tracked::dropped());
    }
}

#[test]
fn test_random_failures_never_corrupt() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for seed in 200..232 {
        tracked::reset();
        let mut array = DynamicArray::new();
        for op in random_ops(seed, 200, 16) {
            let before = values(&array);
            tracked::fail_after(rng.usize(0..4));
            let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                apply_tracked(&mut array, &op)
            }));
            tracked::never_fail();

            // A failed assignment may have overwritten a prefix already.
            if res.is_err() && !matches!(op, Op::Assign(_)) {
                assert_eq!(values(&array), before, "seed {seed}: {op:?}");
            }
            assert!(array.len() <= array.capacity());
            assert_eq!(tracked::live(), array.len() as isize, "seed {seed}: {op:?}");
        }
    }
}
