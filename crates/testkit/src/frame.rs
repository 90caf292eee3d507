//! In-memory tabular data.
//!
//! A [`Frame`] is the dataframe-like shape every table definition is
//! reduced to before ingestion: named columns, one index label per row, and
//! row-major cells.  Markdown table definitions parse into frames, and
//! computed tables can be turned back into frames with
//! [`table_to_frame`](crate::output::table_to_frame).

use feldera_testkit_types::{TestkitError, Value};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    index: Vec<Value>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            index: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builds a frame whose index is the row position.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> Result<Self, TestkitError> {
        let mut frame = Self::new(columns);
        for row in rows {
            let position = Value::Int(frame.len() as i64);
            frame.push_row(position, row)?;
        }
        Ok(frame)
    }

    pub fn push_row(&mut self, index: Value, row: Vec<Value>) -> Result<(), TestkitError> {
        if row.len() != self.columns.len() {
            return Err(TestkitError::InvalidConfig(format!(
                "row has {} values, but the frame has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.index.push(index);
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of column `name`, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let position = self.column_position(name)?;
        Some(self.rows.iter().map(move |row| &row[position]))
    }

    /// Replaces the values of an existing column or appends a new one.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), TestkitError> {
        if values.len() != self.len() {
            return Err(TestkitError::InvalidConfig(format!(
                "column {name:?} has {} values, but the frame has {} rows",
                values.len(),
                self.len()
            )));
        }
        match self.column_position(name) {
            Some(position) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[position] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Values of column `name` as integers, or `None` when the frame has no
    /// such column.  Nulls and non-integer values are an error.
    pub fn int_column(&self, name: &str) -> Result<Option<Vec<i64>>, TestkitError> {
        let Some(values) = self.column(name) else {
            return Ok(None);
        };
        values
            .map(|value| {
                value
                    .as_int()
                    .ok_or_else(|| TestkitError::NonIntegerPseudoColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }


    pub fn index(&self) -> &[Value] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Cell of column `name` in row `row`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let position = self.column_position(name)?;
        self.rows.get(row).map(|r| &r[position])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
