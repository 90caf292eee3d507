use feldera_testkit_types::{CapturedRow, Key, TestkitError, Value};
use indexmap::IndexMap;

/// Reduces captured updates to the final state of each key.
///
/// The updates of a key are consolidated: equal rows have their diffs
/// added up and rows whose diffs cancel out disappear.  A key with nothing
/// left is absent from the result, a key left with a single row of weight
/// one maps to that row, and anything else cannot be the state of a keyed
/// table and is reported as [`TestkitError::InconsistentUpdates`].
///
/// Keys appear in the order of their first update.
pub fn squash_updates(
    captured: &[CapturedRow],
) -> Result<IndexMap<Key, Vec<Value>>, TestkitError> {
    let mut consolidated: IndexMap<Key, Vec<(&[Value], i64)>> = IndexMap::new();
    for row in captured {
        let states = consolidated.entry(row.key).or_default();
        match states
            .iter_mut()
            .find(|(values, _)| *values == row.values.as_slice())
        {
            Some((_, weight)) => *weight += row.diff,
            None => states.push((row.values.as_slice(), row.diff)),
        }
    }

    let mut squashed = IndexMap::with_capacity(consolidated.len());
    for (key, mut states) in consolidated {
        states.retain(|(_, weight)| *weight != 0);
        match states.as_slice() {
            [] => {}
            [(values, 1)] => {
                squashed.insert(key, values.to_vec());
            }
            states => {
                return Err(TestkitError::InconsistentUpdates {
                    key: key.to_string(),
                    rows: states.iter().map(|(_, weight)| weight.unsigned_abs() as usize).sum(),
                })
            }
        }
    }
    Ok(squashed)
}
