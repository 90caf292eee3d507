//! Validation and normalization of logical batches.

use feldera_testkit_types::{Key, Polarity, TestkitError, TestkitWarning, Timestamp, Value, WorkerId};
use std::collections::{BTreeMap, BTreeSet};

/// A row of a logical batch: `diff` is `1` for an insertion and `-1` for a
/// retraction.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub diff: i64,
    pub key: Key,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(diff: i64, key: Key, values: Vec<Value>) -> Self {
        Self { diff, key, values }
    }

    pub fn insert(key: Key, values: Vec<Value>) -> Self {
        Self::new(1, key, values)
    }

    pub fn delete(key: Key, values: Vec<Value>) -> Self {
        Self::new(-1, key, values)
    }
}

/// Rows by timestamp, then by worker, as written by a test.
pub type LogicalBatches = BTreeMap<i64, BTreeMap<WorkerId, Vec<Row>>>;

#[derive(Clone, Debug, PartialEq)]
pub struct PlannedRow {
    pub polarity: Polarity,
    pub key: Key,
    pub values: Vec<Value>,
}

/// Logical batches after validation: timestamps are even and non-negative
/// and every row has a legal polarity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlannedBatches {
    batches: BTreeMap<Timestamp, BTreeMap<WorkerId, Vec<PlannedRow>>>,
    workers: BTreeSet<WorkerId>,
    warnings: Vec<TestkitWarning>,
}

impl PlannedBatches {
    /// Batches in ascending timestamp order.
    pub fn batches(&self) -> impl Iterator<Item = (Timestamp, &BTreeMap<WorkerId, Vec<PlannedRow>>)> {
        self.batches.iter().map(|(time, batch)| (*time, batch))
    }

    /// Every worker that has rows at any timestamp.
    pub fn workers(&self) -> &BTreeSet<WorkerId> {
        &self.workers
    }

    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.batches.keys().copied()
    }

    /// Warnings raised while planning.
    pub fn warnings(&self) -> &[TestkitWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Validates `batches` as a whole and converts them to their canonical
/// form.
///
/// Negative timestamps and diffs other than `1` and `-1` are errors.  A
/// timestamp `0` raises [`TestkitWarning::BackfillTimestamp`].  When any
/// timestamp is odd, every timestamp is doubled and
/// [`TestkitWarning::OddTimestampsDoubled`] is raised.
pub fn plan_batches(batches: LogicalBatches) -> Result<PlannedBatches, TestkitError> {
    if let Some(&time) = batches.keys().find(|time| **time < 0) {
        return Err(TestkitError::NegativeTimestamp(time));
    }

    let mut warnings = Vec::new();
    if batches.contains_key(&0) {
        warnings.push(TestkitWarning::BackfillTimestamp);
    }
    let scale = if batches.keys().any(|time| time % 2 == 1) {
        warnings.push(TestkitWarning::OddTimestampsDoubled);
        2
    } else {
        1
    };

    let mut planned = BTreeMap::new();
    let mut workers = BTreeSet::new();
    for (time, batch) in batches {
        let mut planned_batch = BTreeMap::new();
        for (worker, rows) in batch {
            workers.insert(worker);
            let rows = rows
                .into_iter()
                .map(|Row { diff, key, values }| {
                    Ok(PlannedRow {
                        polarity: Polarity::try_from(diff)?,
                        key,
                        values,
                    })
                })
                .collect::<Result<Vec<_>, TestkitError>>()?;
            planned_batch.insert(worker, rows);
        }
        planned.insert(time as Timestamp * scale, planned_batch);
    }

    Ok(PlannedBatches {
        batches: planned,
        workers,
        warnings,
    })
}
