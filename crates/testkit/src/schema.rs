//! Schema inference and value normalization for frames.

use crate::frame::Frame;
use feldera_testkit_types::{ColumnSchema, DType, Schema, TestkitError, Value};

/// Infers a schema from the columns of `frame` that are not in `exclude`.
///
/// Columns listed in `id_from` are marked as primary key; each of them must
/// exist in the frame.
pub fn schema_from_frame(
    frame: &Frame,
    id_from: Option<&[String]>,
    exclude: &[&str],
) -> Result<Schema, TestkitError> {
    let id_from = id_from.unwrap_or_default();
    if let Some(missing) = id_from.iter().find(|name| !frame.has_column(name)) {
        return Err(TestkitError::MissingColumn(missing.clone()));
    }

    let columns = frame
        .columns()
        .iter()
        .filter(|name| !exclude.contains(&name.as_str()))
        .map(|name| {
            // The column exists: we are iterating over the frame's own names.
            let dtype = frame
                .column(name)
                .map(|values| infer_dtype(values))
                .unwrap_or(DType::Any);
            ColumnSchema {
                name: name.clone(),
                dtype,
                primary_key: id_from.contains(name),
            }
        })
        .collect();
    Ok(Schema::new(columns))
}

/// Common type of `values`: nullable when any value is null, `Float` when
/// integers and floats mix, `Any` when nothing else fits.
pub fn infer_dtype<'a>(values: impl Iterator<Item = &'a Value>) -> DType {
    let mut dtype: Option<DType> = None;
    let mut nullable = false;

    for value in values {
        let Some(current) = DType::of_value(value) else {
            nullable = true;
            continue;
        };
        dtype = Some(match dtype {
            None => current,
            Some(previous) if previous == current => previous,
            Some(DType::Int) | Some(DType::Float)
                if matches!(current, DType::Int | DType::Float) =>
            {
                DType::Float
            }
            Some(_) => DType::Any,
        });
    }

    match dtype {
        None => DType::Any,
        Some(dtype) if nullable => dtype.optional(),
        Some(dtype) => dtype,
    }
}

/// Coerces `value` to the engine's representation of `dtype`.
///
/// Integral floats in integer columns collapse to integers and integers in
/// float columns widen to floats; anything else is returned unchanged.
pub fn normalize_value(value: Value, dtype: &DType) -> Value {
    match (dtype.unoptionalized(), value) {
        (DType::Int, Value::Float(f))
            if f.0.fract() == 0.0 && f.0 >= i64::MIN as f64 && f.0 < i64::MAX as f64 =>
        {
            Value::Int(f.0 as i64)
        }
        (DType::Float, Value::Int(i)) => Value::from(i as f64),
        (_, value) => value,
    }
}

/// Cells of `frame` in the column order of `schema`, each normalized to its
/// column type.
pub fn normalized_rows(frame: &Frame, schema: &Schema) -> Result<Vec<Vec<Value>>, TestkitError> {
    let positions = schema
        .columns
        .iter()
        .map(|column| {
            frame
                .column_position(&column.name)
                .map(|position| (position, &column.dtype))
                .ok_or_else(|| TestkitError::MissingColumn(column.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(frame
        .rows()
        .iter()
        .map(|row| {
            positions
                .iter()
                .map(|(position, dtype)| normalize_value(row[*position].clone(), dtype))
                .collect()
        })
        .collect())
}
