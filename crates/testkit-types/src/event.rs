//! Change events fed to the engine and rows captured from it.

use crate::error::TestkitError;
use crate::key::Key;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Logical time of a batch.  Replayed timestamps are always even.
pub type Timestamp = u64;

/// Index of the engine worker that processes a sequence of events.
pub type WorkerId = usize;

/// Identifier of a synthetic change stream.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamId(String);

impl StreamId {
    pub fn for_sequence_number(n: u64) -> Self {
        Self(format!("_stream_generator_{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StreamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a row is inserted or retracted.
///
/// Only weights of exactly `1` and `-1` are representable, so anything
/// holding a `Polarity` has already passed diff validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Polarity {
    Insert,
    Delete,
}

impl Polarity {
    pub fn diff(self) -> i64 {
        match self {
            Polarity::Insert => 1,
            Polarity::Delete => -1,
        }
    }
}

impl TryFrom<i64> for Polarity {
    type Error = TestkitError;

    fn try_from(diff: i64) -> Result<Self, Self::Error> {
        match diff {
            1 => Ok(Polarity::Insert),
            -1 => Ok(Polarity::Delete),
            other => Err(TestkitError::InvalidDiff(other)),
        }
    }
}

/// One entry of a replayed per-worker snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum SnapshotEvent {
    /// Commit boundary: every later event belongs to this time.
    AdvanceTime(Timestamp),
    Insert(Key, Vec<Value>),
    Delete(Key, Vec<Value>),
}

impl SnapshotEvent {
    pub fn advance_time(timestamp: Timestamp) -> Self {
        Self::AdvanceTime(timestamp)
    }

    pub fn insert(key: Key, values: Vec<Value>) -> Self {
        Self::Insert(key, values)
    }

    pub fn delete(key: Key, values: Vec<Value>) -> Self {
        Self::Delete(key, values)
    }
}

/// A single update produced by the engine for an output table.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedRow {
    pub key: Key,
    pub values: Vec<Value>,
    pub time: Timestamp,
    pub diff: i64,
}

impl CapturedRow {
    pub fn new(key: Key, values: Vec<Value>, time: Timestamp, diff: i64) -> Self {
        Self {
            key,
            values,
            time,
            diff,
        }
    }
}

/// Everything the engine produced for one output table, in arrival order.
pub type CapturedStream = Vec<CapturedRow>;

#[cfg(test)]
mod test {
    use super::{Polarity, StreamId};
    use crate::error::TestkitError;

    #[test]
    fn polarity_accepts_unit_diffs_only() {
        assert_eq!(Polarity::try_from(1).unwrap(), Polarity::Insert);
        assert_eq!(Polarity::try_from(-1).unwrap(), Polarity::Delete);
        assert!(matches!(
            Polarity::try_from(2),
            Err(TestkitError::InvalidDiff(2))
        ));
        assert!(matches!(
            Polarity::try_from(0),
            Err(TestkitError::InvalidDiff(0))
        ));
    }

    #[test]
    fn stream_ids() {
        assert_eq!(StreamId::for_sequence_number(3).as_str(), "_stream_generator_3");
    }
}
