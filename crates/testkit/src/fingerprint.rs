//! Content fingerprints of static tables.
//!
//! Two static table definitions with the same identity-defining content (up
//! to row order) and the same trust setting share one fingerprint, and
//! therefore one universe.  The hash runs over the versioned value encoding
//! of [`Value::hash_into`], so fingerprints do not depend on the in-memory
//! layout of the data.

use crate::frame::Frame;
use feldera_testkit_types::{TestkitError, Value};
use xxhash_rust::xxh3::Xxh3;

/// Version of the fingerprint encoding.  Bump whenever the set of hashed
/// fields or their encoding changes.
const FINGERPRINT_VERSION: u8 = 1;

const ROW_TAG: u8 = b'r';
const TABLE_TAG: u8 = b't';

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Fingerprint of a single record given as named fields.
    pub fn of_row<'a>(fields: impl IntoIterator<Item = (&'a str, &'a Value)>) -> Self {
        let mut hasher = Xxh3::new();
        hasher.update(&[FINGERPRINT_VERSION, ROW_TAG]);
        for (name, value) in fields {
            hasher.update(&(name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            value.hash_into(&mut hasher);
        }
        Self(hasher.digest128())
    }

    /// Fingerprint of a table given the fingerprints of its rows, in any
    /// order.
    pub fn of_table(unsafe_trusted_ids: bool, mut rows: Vec<Fingerprint>) -> Self {
        rows.sort_unstable();
        let mut hasher = Xxh3::new();
        hasher.update(&[FINGERPRINT_VERSION, TABLE_TAG, unsafe_trusted_ids as u8]);
        hasher.update(&(rows.len() as u64).to_le_bytes());
        for row in rows {
            hasher.update(&row.0.to_le_bytes());
        }
        Self(hasher.digest128())
    }
}

/// Fingerprint of a static table defined by `frame`.
///
/// Each row contributes its identity-defining fields: the `id_from` columns
/// when given, otherwise the index label together with every column.  The
/// `pseudo_columns` present in the frame always contribute.
pub fn fingerprint_frame(
    frame: &Frame,
    id_from: Option<&[String]>,
    pseudo_columns: &[&str],
    unsafe_trusted_ids: bool,
) -> Result<Fingerprint, TestkitError> {
    let names: Vec<&str> = match id_from {
        Some(id_from) => id_from
            .iter()
            .map(String::as_str)
            .chain(
                pseudo_columns
                    .iter()
                    .copied()
                    .filter(|name| frame.has_column(name)),
            )
            .collect(),
        None => frame.columns().iter().map(String::as_str).collect(),
    };
    let positions = names
        .iter()
        .map(|name| {
            frame
                .column_position(name)
                .ok_or_else(|| TestkitError::MissingColumn(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows = frame
        .index()
        .iter()
        .zip(frame.rows())
        .map(|(label, row)| {
            let label = id_from.is_none().then_some(("id", label));
            let fields = names
                .iter()
                .zip(&positions)
                .map(|(name, &position)| (*name, &row[position]));
            Fingerprint::of_row(label.into_iter().chain(fields))
        })
        .collect();

    Ok(Fingerprint::of_table(unsafe_trusted_ids, rows))
}

#[cfg(test)]
mod test {
    use super::{fingerprint_frame, Fingerprint};
    use crate::frame::Frame;
    use feldera_testkit_types::Value;

    fn frame(rows: &[(i64, &str)]) -> Frame {
        Frame::from_rows(
            ["a", "b"],
            rows.iter()
                .map(|(a, b)| vec![Value::Int(*a), Value::from(*b)]),
        )
        .unwrap()
    }

    #[test]
    fn row_order_is_irrelevant() {
        let rows = vec![
            Fingerprint::of_row([("a", &Value::Int(1))]),
            Fingerprint::of_row([("a", &Value::Int(2))]),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();
        assert_eq!(
            Fingerprint::of_table(false, rows.clone()),
            Fingerprint::of_table(false, reversed)
        );
        assert_ne!(
            Fingerprint::of_table(false, rows.clone()),
            Fingerprint::of_table(true, rows)
        );
    }

    #[test]
    fn field_names_matter() {
        assert_ne!(
            Fingerprint::of_row([("a", &Value::Int(1))]),
            Fingerprint::of_row([("b", &Value::Int(1))])
        );
    }

    #[test]
    fn every_value_contributes_without_id_from() {
        let base = fingerprint_frame(&frame(&[(1, "x"), (2, "y")]), None, &[], false).unwrap();
        assert_eq!(
            base,
            fingerprint_frame(&frame(&[(1, "x"), (2, "y")]), None, &[], false).unwrap()
        );
        assert_ne!(
            base,
            fingerprint_frame(&frame(&[(1, "x"), (2, "z")]), None, &[], false).unwrap()
        );
    }

    #[test]
    fn only_identity_columns_contribute_with_id_from() {
        let id_from = ["a".to_string()];
        assert_eq!(
            fingerprint_frame(&frame(&[(1, "x")]), Some(&id_from), &[], false).unwrap(),
            fingerprint_frame(&frame(&[(1, "y")]), Some(&id_from), &[], false).unwrap()
        );
    }
}
