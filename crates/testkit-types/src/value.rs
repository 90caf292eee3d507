//! Typed scalar values.
//!
//! [`Value`] is the engine's native scalar model.  Everything a test table
//! can hold is normalized to one of these variants before it is turned into
//! events, hashed into a key or fingerprint, or printed.

use crate::key::Key;
use chrono::{Duration, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde_json::Value as JsonValue;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use xxhash_rust::xxh3::Xxh3;

/// A dynamically typed cell value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    String(Arc<str>),
    Bytes(Arc<[u8]>),
    Pointer(Key),
    Tuple(Arc<[Value]>),
    Json(Arc<JsonValue>),
    DateTimeNaive(NaiveDateTime),
    Duration(Duration),
    IntArray(Arc<[i64]>),
    FloatArray(Arc<[OrderedFloat<f64>]>),
}

// Type tags of the hash encoding.  Changing any of them changes every key
// and fingerprint derived from values.
const TAG_NONE: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_INT: u8 = 2;
const TAG_FLOAT: u8 = 3;
const TAG_STRING: u8 = 4;
const TAG_BYTES: u8 = 5;
const TAG_POINTER: u8 = 6;
const TAG_TUPLE: u8 = 7;
const TAG_JSON: u8 = 8;
const TAG_DATE_TIME_NAIVE: u8 = 9;
const TAG_DURATION: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_FLOAT_ARRAY: u8 = 12;

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Structured values whose canonical order is the order of their
    /// printable form.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Json(_))
    }

    /// Array values have no total order at all.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::IntArray(_) | Value::FloatArray(_))
    }

    pub fn tuple(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(values.into_iter().collect())
    }

    pub fn json(value: JsonValue) -> Self {
        Value::Json(Arc::new(value))
    }

    /// Feeds the versioned encoding of the value into `hasher`.
    ///
    /// Floats are normalized first: `-0.0` hashes like `0.0` and all NaNs
    /// hash identically.
    pub fn hash_into(&self, hasher: &mut Xxh3) {
        match self {
            Value::None => hasher.update(&[TAG_NONE]),
            Value::Bool(b) => hasher.update(&[TAG_BOOL, *b as u8]),
            Value::Int(i) => {
                hasher.update(&[TAG_INT]);
                hasher.update(&i.to_le_bytes());
            }
            Value::Float(f) => {
                hasher.update(&[TAG_FLOAT]);
                hasher.update(&normalized_float_bits(f.0).to_le_bytes());
            }
            Value::String(s) => {
                hasher.update(&[TAG_STRING]);
                update_with_len(hasher, s.as_bytes());
            }
            Value::Bytes(b) => {
                hasher.update(&[TAG_BYTES]);
                update_with_len(hasher, b);
            }
            Value::Pointer(key) => {
                hasher.update(&[TAG_POINTER]);
                hasher.update(&key.as_u128().to_le_bytes());
            }
            Value::Tuple(values) => {
                hasher.update(&[TAG_TUPLE]);
                hasher.update(&(values.len() as u64).to_le_bytes());
                for value in values.iter() {
                    value.hash_into(hasher);
                }
            }
            Value::Json(json) => {
                hasher.update(&[TAG_JSON]);
                update_with_len(hasher, json.to_string().as_bytes());
            }
            Value::DateTimeNaive(dt) => {
                let utc = dt.and_utc();
                hasher.update(&[TAG_DATE_TIME_NAIVE]);
                hasher.update(&utc.timestamp().to_le_bytes());
                hasher.update(&utc.timestamp_subsec_nanos().to_le_bytes());
            }
            Value::Duration(d) => {
                hasher.update(&[TAG_DURATION]);
                hasher.update(&d.num_seconds().to_le_bytes());
                hasher.update(&d.subsec_nanos().to_le_bytes());
            }
            Value::IntArray(values) => {
                hasher.update(&[TAG_INT_ARRAY]);
                hasher.update(&(values.len() as u64).to_le_bytes());
                for value in values.iter() {
                    hasher.update(&value.to_le_bytes());
                }
            }
            Value::FloatArray(values) => {
                hasher.update(&[TAG_FLOAT_ARRAY]);
                hasher.update(&(values.len() as u64).to_le_bytes());
                for value in values.iter() {
                    hasher.update(&normalized_float_bits(value.0).to_le_bytes());
                }
            }
        }
    }

    /// Writes the value the way it appears nested inside a tuple: strings
    /// and bytes are quoted, everything else uses [`Display`].
    fn fmt_nested(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "'{s}'"),
            other => Display::fmt(other, f),
        }
    }
}

fn update_with_len(hasher: &mut Xxh3, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn normalized_float_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

fn fmt_float(x: f64, f: &mut Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        f.write_str("nan")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "inf" } else { "-inf" })
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

fn fmt_list<T>(
    items: &[T],
    f: &mut Formatter<'_>,
    mut item: impl FnMut(&T, &mut Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, x) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item(x, f)?;
    }
    f.write_str("]")
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => fmt_float(x.0, f),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "b'{}'", b.escape_ascii()),
            Value::Pointer(key) => write!(f, "{key}"),
            Value::Tuple(values) => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    value.fmt_nested(f)?;
                }
                if values.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Value::Json(json) => write!(f, "{json}"),
            Value::DateTimeNaive(dt) => write!(f, "{dt}"),
            Value::Duration(d) => write!(f, "{d}"),
            Value::IntArray(values) => fmt_list(values, f, |x, f| write!(f, "{x}")),
            Value::FloatArray(values) => fmt_list(values, f, |x, f| fmt_float(x.0, f)),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<Key> for Value {
    fn from(value: Key) -> Self {
        Value::Pointer(value)
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Value::json(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTimeNaive(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}
