//! Deterministic rendering of computed tables.
//!
//! Engine output arrives in no particular order.  Before printing, rows are
//! put in canonical order (see [`crate::compare`]) so that the text can be
//! compared against an expected table in a test:
//!
//! ```text
//!             | pet | owner
//! ^X1MXHYY... | cat | Bob
//! ^YYY4HAB... | dog | Alice
//! ```

use crate::compare::{compare_rows, sort_best_effort};
use crate::engine::{Engine, OutputCapturer};
use crate::squash::squash_updates;
use crate::table::Table;
use feldera_testkit_types::config::SHORT_POINTER_LENGTH;
use feldera_testkit_types::{
    CapturedRow, Key, PrintOptions, TestkitError, Value, DIFF_PSEUDOCOLUMN, TIME_PSEUDOCOLUMN,
};
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Padding, Style};
use tracing::debug;

/// Computes `table` and prints its final contents to stdout.
pub fn compute_and_print<E>(
    capturer: &OutputCapturer<'_, E>,
    table: &Table,
    options: &PrintOptions,
) -> Result<(), TestkitError>
where
    E: Engine + ?Sized,
{
    print!("{}", compute_and_render(capturer, table, options)?);
    Ok(())
}

/// Computes `table` and prints every update it went through to stdout.
pub fn compute_and_print_update_stream<E>(
    capturer: &OutputCapturer<'_, E>,
    table: &Table,
    options: &PrintOptions,
) -> Result<(), TestkitError>
where
    E: Engine + ?Sized,
{
    print!(
        "{}",
        compute_and_render_update_stream(capturer, table, options)?
    );
    Ok(())
}

/// Like [`compute_and_print`], returning the text instead of printing it.
pub fn compute_and_render<E>(
    capturer: &OutputCapturer<'_, E>,
    table: &Table,
    options: &PrintOptions,
) -> Result<String, TestkitError>
where
    E: Engine + ?Sized,
{
    let captured = capturer.capture(table)?;
    let mut rows = squash_updates(&captured)?.into_iter().collect::<Vec<_>>();
    if let Err(error) = sort_best_effort(&mut rows, |(_, a), (_, b)| compare_rows(a, b)) {
        debug!("printing rows unsorted: {error}");
    }

    let columns = table.column_names();
    Ok(render_table(&columns, &rows, options))
}

/// Like [`compute_and_print_update_stream`], returning the text instead of
/// printing it.
///
/// Every row carries its time and diff in the trailing `__time__` and
/// `__diff__` columns, and rows are ordered by time and diff first.
pub fn compute_and_render_update_stream<E>(
    capturer: &OutputCapturer<'_, E>,
    table: &Table,
    options: &PrintOptions,
) -> Result<String, TestkitError>
where
    E: Engine + ?Sized,
{
    let captured = capturer.capture(table)?;
    let mut rows = captured
        .into_iter()
        .map(|CapturedRow { key, mut values, time, diff }| {
            values.push(Value::Int(time as i64));
            values.push(Value::Int(diff));
            (key, values)
        })
        .collect::<Vec<_>>();
    let result = sort_best_effort(&mut rows, |(_, a), (_, b)| {
        let (a_time, b_time) = (&a[a.len() - 2..], &b[b.len() - 2..]);
        match compare_rows(a_time, b_time)? {
            std::cmp::Ordering::Equal => compare_rows(a, b),
            ordering => Ok(ordering),
        }
    });
    if let Err(error) = result {
        debug!("printing updates unsorted: {error}");
    }

    let mut columns = table.column_names();
    columns.extend([TIME_PSEUDOCOLUMN, DIFF_PSEUDOCOLUMN]);
    Ok(render_table(&columns, &rows, options))
}

fn format_value(value: &Value, none: &str, short_pointers: bool) -> String {
    match value {
        Value::None => none.to_string(),
        Value::Pointer(key) => format_key(key, short_pointers),
        value => value.to_string(),
    }
}

fn format_key(key: &Key, short_pointers: bool) -> String {
    let mut text = key.to_string();
    if short_pointers && text.chars().count() > SHORT_POINTER_LENGTH {
        text = text.chars().take(SHORT_POINTER_LENGTH).collect();
        text.push_str("...");
    }
    text
}

/// Renders rows in aligned columns, one line per row after a header line.
///
/// Columns are separated by ` | ` and cells are left-justified to the width
/// of their column; trailing blanks are dropped.  A lone column without ids
/// prints nulls as `None`; with any other layout a null is an empty cell.
pub fn render_table(columns: &[&str], rows: &[(Key, Vec<Value>)], options: &PrintOptions) -> String {
    if columns.is_empty() && !options.include_id {
        return String::new();
    }
    let none = if options.include_id || columns.len() > 1 {
        ""
    } else {
        "None"
    };

    let mut cells: Vec<Vec<String>> = Vec::new();
    let mut header = Vec::with_capacity(columns.len() + 1);
    if options.include_id {
        header.push(if columns.is_empty() { "id" } else { "" }.to_string());
    }
    header.extend(columns.iter().map(|name| name.to_string()));
    cells.push(header);

    let n_rows = options.n_rows.unwrap_or(usize::MAX);
    for (key, values) in rows.iter().take(n_rows) {
        let mut line = Vec::with_capacity(values.len() + 1);
        if options.include_id {
            line.push(format_key(key, options.short_pointers));
        }
        line.extend(
            values
                .iter()
                .map(|value| format_value(value, none, options.short_pointers)),
        );
        cells.push(line);
    }

    let mut table = Builder::from_iter(cells).build();
    table
        .with(Style::empty().vertical('|'))
        .modify(Columns::last(), Padding::new(1, 0, 0, 0))
        .modify(Columns::first(), Padding::new(0, 1, 0, 0));

    table
        .to_string()
        .lines()
        .map(|line| format!("{}\n", line.trim_end()))
        .collect()
}

#[cfg(test)]
mod test {
    use super::{compute_and_render, compute_and_render_update_stream, render_table};
    use crate::engine::{Engine, OutputCapturer};
    use crate::table::{Graph, Table, TableSource};
    use feldera_testkit_types::{
        CapturedRow, CapturedStream, DType, Key, PrintOptions, RunOptions, Schema, Value,
    };
    use pretty_assertions::assert_eq;

    /// Engine returning a fixed capture, whatever the graph.
    struct CannedEngine(CapturedStream);

    impl Engine for CannedEngine {
        fn run_tables(
            &self,
            tables: &[&Table],
            _options: &RunOptions,
        ) -> anyhow::Result<Vec<CapturedStream>> {
            Ok(tables.iter().map(|_| self.0.clone()).collect())
        }
    }

    fn table(columns: &[&str]) -> Table {
        Graph::new().new_table(
            Schema::from_types(columns.iter().map(|name| (*name, DType::Any))),
            TableSource::Static(Vec::new()),
        )
    }

    fn no_ids() -> PrintOptions {
        PrintOptions::default().with_include_id(false)
    }

    #[test]
    fn lone_none() {
        let rows = [(Key::for_value(&Value::Int(1)), vec![Value::None])];
        assert_eq!(render_table(&["a"], &rows, &no_ids()), "a\nNone\n");

        let with_ids = render_table(&["a"], &rows, &PrintOptions::default());
        let lines = with_ids.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "            | a");
        assert!(lines[1].ends_with("..."), "{with_ids}");
        assert_eq!(lines[1].len(), 11);
    }

    #[test]
    fn alignment() {
        let rows = [
            (Key::from_raw(1), vec![Value::from("dog"), Value::None, Value::Int(1)]),
            (Key::from_raw(2), vec![Value::from("hippopotamus"), Value::Bool(true), Value::Int(100)]),
        ];
        assert_eq!(
            render_table(&["pet", "flag", "n"], &rows, &no_ids()),
            "pet          | flag | n\n\
             dog          |      | 1\n\
             hippopotamus | True | 100\n"
        );
    }

    #[test]
    fn empty_layouts() {
        assert_eq!(render_table(&[], &[(Key::from_raw(1), vec![])], &no_ids()), "");

        let key = Key::from_raw(1);
        let full = PrintOptions::default().with_short_pointers(false);
        assert_eq!(
            render_table(&[], &[(key, vec![])], &full),
            format!("id\n{key}\n")
        );
    }

    #[test]
    fn squashed_and_sorted() {
        let k1 = Key::from_raw(1);
        let k2 = Key::from_raw(2);
        let engine = CannedEngine(vec![
            CapturedRow::new(k1, vec![Value::Int(10)], 2, 1),
            CapturedRow::new(k2, vec![Value::Int(5)], 2, 1),
            CapturedRow::new(k1, vec![Value::Int(10)], 4, -1),
            CapturedRow::new(k1, vec![Value::Int(20)], 4, 1),
        ]);
        let capturer = OutputCapturer::new(&engine, None);
        assert_eq!(
            compute_and_render(&capturer, &table(&["v"]), &no_ids()).unwrap(),
            "v\n5\n20\n"
        );
        assert_eq!(
            compute_and_render(&capturer, &table(&["v"]), &no_ids().with_n_rows(Some(1))).unwrap(),
            "v\n5\n"
        );
    }

    #[test]
    fn update_stream_order() {
        let k1 = Key::from_raw(1);
        let engine = CannedEngine(vec![
            CapturedRow::new(k1, vec![Value::Int(20)], 4, 1),
            CapturedRow::new(k1, vec![Value::Int(10)], 2, 1),
            CapturedRow::new(k1, vec![Value::Int(10)], 4, -1),
        ]);
        let capturer = OutputCapturer::new(&engine, None);
        assert_eq!(
            compute_and_render_update_stream(&capturer, &table(&["v"]), &no_ids()).unwrap(),
            "v  | __time__ | __diff__\n\
             10 | 2        | 1\n\
             10 | 4        | -1\n\
             20 | 4        | 1\n"
        );
    }

    #[test]
    fn arrays_stay_in_arrival_order() {
        let engine = CannedEngine(vec![
            CapturedRow::new(Key::from_raw(1), vec![Value::IntArray(vec![3].into())], 2, 1),
            CapturedRow::new(Key::from_raw(2), vec![Value::IntArray(vec![1].into())], 2, 1),
        ]);
        let capturer = OutputCapturer::new(&engine, None);
        assert_eq!(
            compute_and_render(&capturer, &table(&["a"]), &no_ids()).unwrap(),
            "a\n[3]\n[1]\n"
        );
    }
}
