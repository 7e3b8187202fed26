use advec_testkit::tracked::{self, Tracked, values};

use crate::DynamicArray;

#[test]
fn test_into_iter_yields_in_order() {
    let a: DynamicArray<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let collected: Vec<String> = a.into_iter().collect();
    assert_eq!(collected, ["a", "b", "c"]);
}

#[test]
fn test_into_iter_both_ends() {
    let a = DynamicArray::from(vec![1, 2, 3, 4, 5]);
    let mut it = a.into_iter();
    assert_eq!(it.len(), 5);
    assert_eq!(it.next(), Some(1));
    assert_eq!(it.next_back(), Some(5));
    assert_eq!(it.as_slice(), &[2, 3, 4]);
    assert_eq!(it.size_hint(), (3, Some(3)));
    assert_eq!(it.by_ref().rev().collect::<Vec<_>>(), [4, 3, 2]);
    assert_eq!(it.next(), None);
    assert_eq!(it.next_back(), None);
}

#[test]
fn test_partially_consumed_iterator_drops_the_rest() {
    tracked::reset();
    let a = DynamicArray::from_fn(6, |i| Tracked::new(i as i64));
    let mut it = a.into_iter();
    let first = it.next().unwrap();
    let last = it.next_back().unwrap();
    assert_eq!((first.value(), last.value()), (0, 5));
    assert_eq!(values(it.as_slice()), [1, 2, 3, 4]);
    assert_eq!(tracked::live(), 6);

    drop(it);
    assert_eq!(tracked::live(), 2);
    drop((first, last));
    assert_eq!(tracked::live(), 0);
    assert_eq!(tracked::dropped(), 6);
}

#[test]
fn test_into_vec() {
    tracked::reset();
    let mut a = DynamicArray::new();
    for i in 0..5 {
        a.push(Tracked::new(i));
    }
    let v = a.into_vec();
    assert_eq!(values(&v), [0, 1, 2, 3, 4]);
    assert_eq!(tracked::live(), 5);
    drop(v);
    assert_eq!(tracked::live(), 0);
}

#[test]
fn test_into_iter_empty_and_zero_sized() {
    let mut it = DynamicArray::<String>::new().into_iter();
    assert_eq!(it.next(), None);
    assert!(it.as_slice().is_empty());

    let a: DynamicArray<()> = std::iter::repeat_n((), 4).collect();
    assert_eq!(a.into_iter().count(), 4);
}

#[test]
fn test_borrowing_iterators() {
    let mut a = DynamicArray::from(vec![1, 2, 3]);
    for v in &mut a {
        *v *= 10;
    }
    let sum: i32 = (&a).into_iter().sum();
    assert_eq!(sum, 60);
    assert_eq!(a.iter().rev().copied().collect::<Vec<_>>(), [30, 20, 10]);
}
