//! Row identity assignment for frames.

use crate::frame::Frame;
use feldera_testkit_types::{Key, TestkitError, Value};

/// Computes the key of every row of `frame`.
///
/// With `id_from`, a row's key is derived from the values of those columns.
/// Otherwise it is derived from the row's index label.  When
/// `unsafe_trusted_ids` is set, a label (or single `id_from` value) that
/// already is a pointer is used verbatim.
pub fn ids_from_frame(
    frame: &Frame,
    id_from: Option<&[String]>,
    unsafe_trusted_ids: bool,
) -> Result<Vec<Key>, TestkitError> {
    let trusted = |values: &[Value]| match values {
        [Value::Pointer(key)] if unsafe_trusted_ids => *key,
        values => Key::for_values(values),
    };

    let Some(id_from) = id_from else {
        return Ok(frame
            .index()
            .iter()
            .map(|label| trusted(std::slice::from_ref(label)))
            .collect());
    };

    let positions = id_from
        .iter()
        .map(|name| {
            frame
                .column_position(name)
                .ok_or_else(|| TestkitError::MissingColumn(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(frame
        .rows()
        .iter()
        .map(|row| {
            let values = positions.iter().map(|&p| row[p].clone()).collect::<Vec<_>>();
            trusted(&values)
        })
        .collect())
}
