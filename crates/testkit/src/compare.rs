//! Canonical order of output rows.
//!
//! Output is sorted by its values so that printing is reproducible.  `None`
//! sorts before everything else, JSON values sort among themselves by their
//! printable form and tuples sort element by element.  Arrays, and values of
//! unrelated types, have no order; a sort that meets them leaves the rows as
//! they are.

use feldera_testkit_types::Value;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("values `{left}` and `{right}` cannot be ordered")]
pub struct Unorderable {
    left: String,
    right: String,
}

impl Unorderable {
    fn new(left: &Value, right: &Value) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

pub fn compare_values(left: &Value, right: &Value) -> Result<Ordering, Unorderable> {
    match (left, right) {
        (Value::None, Value::None) => Ok(Ordering::Equal),
        (Value::None, _) => Ok(Ordering::Less),
        (_, Value::None) => Ok(Ordering::Greater),
        (left, right) if left.is_array() || right.is_array() => {
            Err(Unorderable::new(left, right))
        }
        (left, right) if left.is_container() && right.is_container() => {
            Ok(left.to_string().cmp(&right.to_string()))
        }
        (Value::Tuple(left), Value::Tuple(right)) => compare_rows(left, right),
        (Value::Bool(left), Value::Bool(right)) => Ok(left.cmp(right)),
        (Value::Int(left), Value::Int(right)) => Ok(left.cmp(right)),
        (Value::Float(left), Value::Float(right)) => Ok(left.cmp(right)),
        (Value::Int(left), Value::Float(right)) => Ok(OrderedFloat(*left as f64).cmp(right)),
        (Value::Float(left), Value::Int(right)) => Ok(left.cmp(&OrderedFloat(*right as f64))),
        (Value::String(left), Value::String(right)) => Ok(left.cmp(right)),
        (Value::Bytes(left), Value::Bytes(right)) => Ok(left.cmp(right)),
        (Value::Pointer(left), Value::Pointer(right)) => Ok(left.cmp(right)),
        (Value::DateTimeNaive(left), Value::DateTimeNaive(right)) => Ok(left.cmp(right)),
        (Value::Duration(left), Value::Duration(right)) => Ok(left.cmp(right)),
        (left, right) => Err(Unorderable::new(left, right)),
    }
}

/// Lexicographic order of two rows under [`compare_values`].
pub fn compare_rows(left: &[Value], right: &[Value]) -> Result<Ordering, Unorderable> {
    for (left, right) in left.iter().zip(right) {
        match compare_values(left, right)? {
            Ordering::Equal => continue,
            ordering => return Ok(ordering),
        }
    }
    Ok(left.len().cmp(&right.len()))
}

/// Sorts `items` stably with a fallible comparator.
///
/// When any comparison fails, `items` keeps its original order and the
/// error is returned.  The sort itself never panics, whatever the
/// comparator answers.
pub fn sort_best_effort<T, F>(items: &mut Vec<T>, mut compare: F) -> Result<(), Unorderable>
where
    F: FnMut(&T, &T) -> Result<Ordering, Unorderable>,
{
    let permutation = merge_sort((0..items.len()).collect(), &mut |a: &usize, b: &usize| {
        compare(&items[*a], &items[*b])
    })?;

    let mut slots = std::mem::take(items).into_iter().map(Some).collect::<Vec<_>>();
    items.extend(
        permutation
            .into_iter()
            .filter_map(|position| slots[position].take()),
    );
    Ok(())
}

/// Stable top-down merge sort that stops at the first failed comparison.
fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Result<Vec<T>, Unorderable>
where
    F: FnMut(&T, &T) -> Result<Ordering, Unorderable>,
{
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare)?;
    let right = merge_sort(right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l)? == Ordering::Less,
            _ => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

#[cfg(test)]
mod test {
    use super::{compare_rows, compare_values, sort_best_effort};
    use feldera_testkit_types::{Key, Value};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;
    use std::cmp::Ordering;

    #[test]
    fn none_is_minimal() {
        assert_eq!(compare_values(&Value::None, &Value::Int(i64::MIN)), Ok(Ordering::Less));
        assert_eq!(compare_values(&Value::from("a"), &Value::None), Ok(Ordering::Greater));
        assert_eq!(compare_values(&Value::None, &Value::None), Ok(Ordering::Equal));
    }

    #[test]
    fn scalars() {
        assert_eq!(compare_values(&Value::Int(1), &Value::Int(2)), Ok(Ordering::Less));
        assert_eq!(compare_values(&Value::Int(2), &Value::from(1.5)), Ok(Ordering::Greater));
        assert_eq!(compare_values(&Value::from("b"), &Value::from("a")), Ok(Ordering::Greater));
        assert_eq!(
            compare_values(
                &Value::Pointer(Key::from_raw(1)),
                &Value::Pointer(Key::from_raw(2))
            ),
            Ok(Ordering::Less)
        );
        assert!(compare_values(&Value::from("1"), &Value::Int(1)).is_err());
    }

    #[test]
    fn json_compares_as_text() {
        let a = Value::json(json!({"a": 1}));
        let b = Value::json(json!({"b": 0}));
        assert_eq!(compare_values(&a, &b), Ok(Ordering::Less));
        assert_eq!(
            compare_values(&Value::json(json!(10)), &Value::json(json!(9))),
            Ok(Ordering::Less)
        );
        assert!(compare_values(&a, &Value::Int(3)).is_err());
        assert!(compare_values(&Value::from("x"), &b).is_err());
        assert_eq!(compare_values(&Value::None, &a), Ok(Ordering::Less));
    }

    #[test]
    fn tuples_compare_element_wise() {
        assert_eq!(
            compare_values(&Value::tuple([Value::Int(2)]), &Value::tuple([Value::Int(10)])),
            Ok(Ordering::Less)
        );
        assert_eq!(
            compare_values(
                &Value::tuple([Value::Int(1), Value::from("b")]),
                &Value::tuple([Value::Int(1), Value::from("a")])
            ),
            Ok(Ordering::Greater)
        );
        assert_eq!(
            compare_values(&Value::tuple([Value::Int(1)]), &Value::tuple([Value::Int(1), Value::None])),
            Ok(Ordering::Less)
        );
        assert!(compare_values(&Value::tuple([Value::Int(1)]), &Value::Int(1)).is_err());
    }

    #[test]
    fn arrays_are_unorderable() {
        let array = Value::IntArray(vec![1, 2].into());
        assert!(compare_values(&array, &array).is_err());
        assert!(compare_values(&array, &Value::None).is_ok());
    }

    #[test]
    fn rows() {
        assert_eq!(
            compare_rows(&[Value::Int(1), Value::from("b")], &[Value::Int(1), Value::from("a")]),
            Ok(Ordering::Greater)
        );
        assert_eq!(
            compare_rows(&[Value::None, Value::Int(9)], &[Value::Int(0), Value::Int(0)]),
            Ok(Ordering::Less)
        );
    }

    #[test]
    fn failed_sort_keeps_the_original_order() {
        let mut rows = vec![
            vec![Value::Int(3)],
            vec![Value::IntArray(vec![1].into())],
            vec![Value::Int(1)],
        ];
        let original = rows.clone();
        assert!(sort_best_effort(&mut rows, |a, b| compare_rows(a, b)).is_err());
        assert_eq!(rows, original);
    }

    #[test]
    fn mixed_json_and_ints_keep_their_order() {
        for seed in 0..200i64 {
            let mut rows = (0..64i64)
                .map(|n| {
                    let n = (n * 7919 + seed * 104_729) % 97;
                    if (n + seed) % 3 == 0 {
                        vec![Value::json(json!(n))]
                    } else {
                        vec![Value::Int(n)]
                    }
                })
                .collect::<Vec<_>>();
            let original = rows.clone();
            assert!(sort_best_effort(&mut rows, |a, b| compare_rows(a, b)).is_err());
            assert_eq!(rows, original);
        }
    }

    #[test]
    fn inconsistent_comparator_does_not_panic() {
        let mut items = (0..100u32).collect::<Vec<_>>();
        let mut calls = 0u32;
        sort_best_effort(&mut items, |_, _| {
            calls += 1;
            Ok(if calls % 2 == 0 { Ordering::Less } else { Ordering::Greater })
        })
        .unwrap();
        items.sort();
        assert_eq!(items, (0..100).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn sorts_like_option(values in proptest::collection::vec(proptest::option::of(any::<i64>()), 0..50)) {
            let mut rows = values.iter().map(|value| vec![Value::from(*value)]).collect::<Vec<_>>();
            sort_best_effort(&mut rows, |a, b| compare_rows(a, b)).unwrap();

            let mut expected = values.clone();
            expected.sort();
            let expected = expected.into_iter().map(|value| vec![Value::from(value)]).collect::<Vec<_>>();
            prop_assert_eq!(rows, expected);
        }
    }
}
