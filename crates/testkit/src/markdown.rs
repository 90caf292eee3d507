//! Markdown table definitions.
//!
//! Tests describe small tables inline:
//!
//! ```text
//!     | pet | owner | age
//!   1 | dog | Alice | 10
//!   2 | cat | Bob   | 9
//! ```
//!
//! Fields are separated by `|` or by whitespace.  The first header column
//! that is unnamed or named `id` holds row labels; without one, rows are
//! labelled by position.

use crate::frame::Frame;
use feldera_testkit_types::{TestkitError, Value};
use once_cell::sync::Lazy;
use regex::Regex;

static FIELD_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\s*\|\s*)|\s+").unwrap());

/// Cells parsed as null.
const NA_VALUES: [&str; 6] = ["", "None", "NaN", "nan", "NA", "NULL"];

/// Parses a markdown table definition into a [`Frame`].
///
/// Column types are inferred from the cells: a column whose non-null cells
/// are all integers holds `Int`s, all numbers `Float`s, all `true`/`false`
/// `Bool`s; any other column holds strings.
pub fn parse_markdown(definition: &str) -> Result<Frame, TestkitError> {
    let mut lines = definition
        .trim_start_matches('\n')
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, normalize_line(line)))
        .filter(|(_, line)| !line.is_empty() && !is_rule(line));

    let Some((_, header)) = lines.next() else {
        return Ok(Frame::default());
    };
    let names = split_fields(header);
    let index_column = names.iter().position(|name| name.is_empty() || *name == "id");

    let mut cells = Vec::new();
    for (line_number, line) in lines {
        let fields = split_fields(line);
        if fields.len() != names.len() {
            return Err(TestkitError::parse(
                line_number,
                format!(
                    "expected {} fields, found {}: {line:?}",
                    names.len(),
                    fields.len()
                ),
            ));
        }
        cells.push(fields);
    }

    let mut columns = (0..names.len())
        .map(|c| parse_column(cells.iter().map(|row| row[c])))
        .collect::<Vec<_>>();
    let index = match index_column {
        Some(position) => columns.remove(position),
        None => (0..cells.len() as i64).map(Value::Int).collect(),
    };

    let mut frame = Frame::new(
        names
            .iter()
            .enumerate()
            .filter(|(position, _)| Some(*position) != index_column)
            .map(|(_, name)| *name),
    );
    for (row, label) in index.into_iter().enumerate() {
        let values = columns.iter().map(|column| column[row].clone()).collect();
        frame.push_row(label, values)?;
    }
    Ok(frame)
}

fn normalize_line(line: &str) -> &str {
    let line = line.trim();
    line.strip_suffix('|').map_or(line, str::trim_end)
}

/// Markdown header separators such as `---|:---:`.
fn is_rule(line: &str) -> bool {
    line.contains('-') && line.chars().all(|c| matches!(c, '-' | '|' | ':' | '+' | ' '))
}

fn split_fields(line: &str) -> Vec<&str> {
    FIELD_SEPARATOR.split(line).collect()
}

fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_column<'a>(cells: impl Iterator<Item = &'a str>) -> Vec<Value> {
    let cells = cells.collect::<Vec<_>>();
    let present = || cells.iter().filter(|cell| !is_na(cell));

    let parse: fn(&str) -> Value = if present().all(|cell| cell.parse::<i64>().is_ok()) {
        |cell| Value::Int(cell.parse().unwrap_or_default())
    } else if present().all(|cell| cell.parse::<f64>().is_ok()) {
        |cell| Value::from(cell.parse::<f64>().unwrap_or(f64::NAN))
    } else if present().all(|cell| parse_bool(cell).is_some()) {
        |cell| Value::Bool(parse_bool(cell).unwrap_or_default())
    } else {
        |cell| Value::from(cell)
    };

    cells
        .iter()
        .map(|cell| if is_na(cell) { Value::None } else { parse(cell) })
        .collect()
}
