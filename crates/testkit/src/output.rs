//! Computed tables as in-memory data.

use crate::engine::{Engine, OutputCapturer};
use crate::frame::Frame;
use crate::squash::squash_updates;
use crate::table::Table;
use feldera_testkit_types::{Key, TestkitError, Value};
use indexmap::IndexMap;

/// Column name to the value of each key.
pub type ColumnData = IndexMap<String, IndexMap<Key, Value>>;

/// Computes `table` and returns its keys, in order of first appearance,
/// along with its columns.
pub fn table_to_dicts<E>(
    capturer: &OutputCapturer<'_, E>,
    table: &Table,
) -> Result<(Vec<Key>, ColumnData), TestkitError>
where
    E: Engine + ?Sized,
{
    let squashed = squash_updates(&capturer.capture(table)?)?;
    let keys = squashed.keys().copied().collect::<Vec<_>>();
    let columns = table
        .column_names()
        .into_iter()
        .enumerate()
        .map(|(position, name)| {
            let values = squashed
                .iter()
                .map(|(key, values)| (*key, values.get(position).cloned().unwrap_or_default()))
                .collect();
            (name.to_string(), values)
        })
        .collect();
    Ok((keys, columns))
}

/// Computes `table` into a [`Frame`].  With `include_id` rows are labelled
/// by their keys, otherwise by position.
pub fn table_to_frame<E>(
    capturer: &OutputCapturer<'_, E>,
    table: &Table,
    include_id: bool,
) -> Result<Frame, TestkitError>
where
    E: Engine + ?Sized,
{
    let (keys, columns) = table_to_dicts(capturer, table)?;
    let mut frame = Frame::new(columns.keys().cloned());
    for (position, key) in keys.iter().enumerate() {
        let label = if include_id {
            Value::Pointer(*key)
        } else {
            Value::Int(position as i64)
        };
        let row = columns
            .values()
            .map(|column| column.get(key).cloned().unwrap_or_default())
            .collect();
        frame.push_row(label, row)?;
    }
    Ok(frame)
}
