//! Static tables from frames and markdown.
//!
//! A static table is fully known when the graph is built.  The optional
//! pseudo-columns `__time__` and `__diff__` place each row at a timestamp
//! and mark it as an insertion (`1`) or a retraction (`-1`).  Building the
//! same content twice yields tables in the same universe.

use crate::fingerprint::fingerprint_frame;
use crate::frame::Frame;
use crate::ids::ids_from_frame;
use crate::markdown::parse_markdown;
use crate::schema::{normalized_rows, schema_from_frame};
use crate::table::{Graph, StaticRow, Table, TableSource};
use feldera_testkit_types::{
    IngestOptions, Polarity, Schema, TestkitError, TestkitWarning, Value, DIFF_PSEUDOCOLUMN,
    FRAME_PSEUDOCOLUMNS, TIME_PSEUDOCOLUMN,
};
use itertools::Itertools;

/// Builds a static table from `frame`.
pub fn table_from_frame(
    graph: &mut Graph,
    mut frame: Frame,
    options: &IngestOptions,
) -> Result<Table, TestkitError> {
    if options.id_from.is_some() && options.schema.is_some() {
        return Err(TestkitError::MutuallyExclusive("id_from", "schema"));
    }

    if let Some(schema) = &options.schema {
        check_schema(schema, &frame, &FRAME_PSEUDOCOLUMNS)?;
    }

    let warnings = validate_frame(&mut frame)?;
    graph.warnings_mut().extend(warnings);

    let id_from = resolve_id_from(options);
    let schema = match &options.schema {
        Some(schema) => schema.clone(),
        None => schema_from_frame(&frame, id_from.as_deref(), &FRAME_PSEUDOCOLUMNS)?,
    };

    let keys = ids_from_frame(&frame, id_from.as_deref(), options.unsafe_trusted_ids)?;
    let fingerprint = fingerprint_frame(
        &frame,
        id_from.as_deref(),
        &FRAME_PSEUDOCOLUMNS,
        options.unsafe_trusted_ids,
    )?;

    let times = frame.int_column(TIME_PSEUDOCOLUMN)?;
    let diffs = frame.int_column(DIFF_PSEUDOCOLUMN)?;
    let rows = normalized_rows(&frame, &schema)?
        .into_iter()
        .zip(keys)
        .enumerate()
        .map(|(n, (values, key))| {
            // Validated above: times are non-negative and diffs are units.
            let time = times.as_ref().map_or(0, |times| times[n] as u64);
            let polarity = match diffs.as_ref().map_or(1, |diffs| diffs[n]) {
                -1 => Polarity::Delete,
                _ => Polarity::Insert,
            };
            StaticRow {
                key,
                values,
                time,
                polarity,
            }
        })
        .collect();

    let table = graph.new_table(schema, TableSource::Static(rows));
    Ok(graph.static_tables_mut().get_or_insert(fingerprint, table))
}

/// Builds a static table from a markdown table definition.
pub fn table_from_markdown(
    graph: &mut Graph,
    definition: &str,
    options: &IngestOptions,
) -> Result<Table, TestkitError> {
    table_from_frame(graph, parse_markdown(definition)?, options)
}

#[deprecated(note = "use `table_from_markdown` instead")]
pub fn parse_to_table(
    graph: &mut Graph,
    definition: &str,
    options: &IngestOptions,
) -> Result<Table, TestkitError> {
    graph.warnings_mut().emit(TestkitWarning::Deprecated {
        name: "parse_to_table",
        replacement: "table_from_markdown",
    });
    table_from_markdown(graph, definition, options)
}

/// Explicit `id_from`, or the primary key of the supplied schema.
pub(crate) fn resolve_id_from(options: &IngestOptions) -> Option<Vec<String>> {
    if let Some(id_from) = &options.id_from {
        return Some(id_from.clone());
    }
    let primary_key = options.schema.as_ref()?.primary_key_columns();
    (!primary_key.is_empty()).then(|| primary_key.into_iter().map(String::from).collect())
}

/// The supplied schema must describe exactly the ordinary columns of the
/// data, in order.
pub(crate) fn check_schema(
    schema: &Schema,
    frame: &Frame,
    pseudo_columns: &[&str],
) -> Result<(), TestkitError> {
    let actual = frame
        .columns()
        .iter()
        .filter(|name| !pseudo_columns.contains(&name.as_str()))
        .cloned()
        .collect_vec();
    let expected = schema.column_names();
    if expected != actual {
        return Err(TestkitError::SchemaMismatch {
            expected: expected.into_iter().map(String::from).collect(),
            actual,
        });
    }
    Ok(())
}

/// Checks the pseudo-columns of a static table definition.
///
/// Nothing is reported unless the whole frame is valid.  Odd timestamps
/// double every timestamp in the frame.
fn validate_frame(frame: &mut Frame) -> Result<Vec<TestkitWarning>, TestkitError> {
    let times = frame.int_column(TIME_PSEUDOCOLUMN)?;
    let diffs = frame.int_column(DIFF_PSEUDOCOLUMN)?;

    if let Some(&time) = times.iter().flatten().find(|time| **time < 0) {
        return Err(TestkitError::NegativeTimestamp(time));
    }
    if let Some(&diff) = diffs.iter().flatten().find(|diff| !matches!(diff, 1 | -1)) {
        return Err(TestkitError::InvalidDiff(diff));
    }

    let mut warnings = Vec::new();
    if let Some(times) = times {
        if times.iter().any(|time| time % 2 == 1) {
            warnings.push(TestkitWarning::OddTimestampsDoubled);
            let doubled = times
                .iter()
                .map(|&time| {
                    time.checked_mul(2)
                        .map(Value::Int)
                        .ok_or(TestkitError::TimestampOverflow(time))
                })
                .collect::<Result<Vec<_>, _>>()?;
            frame.set_column(TIME_PSEUDOCOLUMN, doubled)?;
        }
    }
    Ok(warnings)
}
