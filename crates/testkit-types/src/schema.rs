//! Table schemas.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Column type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Any,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Pointer,
    Json,
    Tuple,
    DateTimeNaive,
    Duration,
    Array,
    Optional(Box<DType>),
}

impl DType {
    /// Type of a single non-null value; `None` for [`Value::None`].
    pub fn of_value(value: &Value) -> Option<DType> {
        let dtype = match value {
            Value::None => return None,
            Value::Bool(_) => DType::Bool,
            Value::Int(_) => DType::Int,
            Value::Float(_) => DType::Float,
            Value::String(_) => DType::String,
            Value::Bytes(_) => DType::Bytes,
            Value::Pointer(_) => DType::Pointer,
            Value::Tuple(_) => DType::Tuple,
            Value::Json(_) => DType::Json,
            Value::DateTimeNaive(_) => DType::DateTimeNaive,
            Value::Duration(_) => DType::Duration,
            Value::IntArray(_) | Value::FloatArray(_) => DType::Array,
        };
        Some(dtype)
    }

    /// Nullable version of the type.  `Any` already admits nulls.
    pub fn optional(self) -> Self {
        match self {
            DType::Any | DType::Optional(_) => self,
            other => DType::Optional(Box::new(other)),
        }
    }

    /// The type with any `Optional` wrapper removed.
    pub fn unoptionalized(&self) -> &DType {
        match self {
            DType::Optional(inner) => inner.unoptionalized(),
            other => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: DType,
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, dtype: DType) -> Self {
        Self {
            name: name.into(),
            dtype,
            primary_key: false,
        }
    }

    pub fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }
}

/// Ordered column definitions of a table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnSchema>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    /// Shorthand for a schema without primary key.
    pub fn from_types<'a>(columns: impl IntoIterator<Item = (&'a str, DType)>) -> Self {
        Self::new(
            columns
                .into_iter()
                .map(|(name, dtype)| ColumnSchema::new(name, dtype))
                .collect(),
        )
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
