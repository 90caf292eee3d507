//! Tables fed from synthetic change streams.
//!
//! A [`StreamGenerator`] turns batch definitions into per-worker event logs
//! and, once all tables are defined, into the persistence configuration
//! under which the engine replays those logs:
//!
//! ```text
//! let mut generator = StreamGenerator::new();
//! let table = generator.table_from_markdown(&mut graph, "
//!     a | _time | _diff
//!     1 | 2     | 1
//!     1 | 4     | -1
//! ", &IngestOptions::default())?;
//! let capturer = OutputCapturer::new(&engine, generator.persistence_config());
//! ```

use crate::frame::Frame;
use crate::ids::ids_from_frame;
use crate::ingest::{check_schema, resolve_id_from};
use crate::markdown::parse_markdown;
use crate::planner::{plan_batches, LogicalBatches, Row};
use crate::registry::ChangeStreamRegistry;
use crate::schema::{normalize_value, normalized_rows, schema_from_frame};
use crate::table::{Graph, Table, TableSource};
use crate::warnings::WarningLog;
use feldera_testkit_types::{
    Backend, IngestOptions, Key, PersistenceConfig, PersistenceMode, Schema, SnapshotAccess,
    TestkitError, Value, WorkerId, STREAM_DIFF_COLUMN, STREAM_PSEUDOCOLUMNS, STREAM_TIME_COLUMN,
    STREAM_WORKER_COLUMN,
};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// A row given as column name to value.
pub type NamedRow = IndexMap<String, Value>;

/// Timestamp of rows without an explicit `_time`, and of the first batch in
/// a list of batches.
const FIRST_TIMESTAMP: i64 = 2;

#[derive(Debug, Default)]
pub struct StreamGenerator {
    registry: ChangeStreamRegistry,
    next_key: u64,
    warnings: WarningLog,
}

impl StreamGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from rows given by timestamp and worker.
    ///
    /// All batches are validated before anything is recorded: on error, no
    /// event of this table reaches the registry.
    pub fn table_from_dict(
        &mut self,
        graph: &mut Graph,
        batches: LogicalBatches,
        schema: Schema,
    ) -> Result<Table, TestkitError> {
        if self.registry.is_frozen() {
            return Err(TestkitError::RegistryFrozen);
        }
        let planned = plan_batches(batches)?;
        self.warnings.extend(planned.warnings().iter().cloned());
        let stream_id = self.registry.register(&planned)?;
        Ok(graph.new_table(schema, TableSource::Replay { stream_id }))
    }

    /// Creates a table from a list of batches, each mapping workers to the
    /// rows they process.  Batches get timestamps 2, 4, 6, ... in order and
    /// rows get fresh keys.
    pub fn table_from_list_of_batches_by_workers(
        &mut self,
        graph: &mut Graph,
        batches: Vec<BTreeMap<WorkerId, Vec<NamedRow>>>,
        schema: Schema,
    ) -> Result<Table, TestkitError> {
        let mut next_key = self.next_key;
        let mut logical = LogicalBatches::new();
        for (timestamp, batch) in (FIRST_TIMESTAMP..).step_by(2).zip(batches) {
            let mut rows_by_worker = BTreeMap::new();
            for (worker, rows) in batch {
                let rows = rows
                    .iter()
                    .map(|row| {
                        let values = named_values(&schema, row)?;
                        let key = Key::for_sequence_number(next_key);
                        next_key += 1;
                        Ok(Row::insert(key, values))
                    })
                    .collect::<Result<Vec<_>, TestkitError>>()?;
                rows_by_worker.insert(worker, rows);
            }
            logical.insert(timestamp, rows_by_worker);
        }

        let table = self.table_from_dict(graph, logical, schema)?;
        self.next_key = next_key;
        Ok(table)
    }

    /// Like [`table_from_list_of_batches_by_workers`], with every row
    /// processed by worker 0.
    ///
    /// [`table_from_list_of_batches_by_workers`]: Self::table_from_list_of_batches_by_workers
    pub fn table_from_list_of_batches(
        &mut self,
        graph: &mut Graph,
        batches: Vec<Vec<NamedRow>>,
        schema: Schema,
    ) -> Result<Table, TestkitError> {
        let batches = batches
            .into_iter()
            .map(|rows| BTreeMap::from([(0, rows)]))
            .collect();
        self.table_from_list_of_batches_by_workers(graph, batches, schema)
    }

    /// Creates a table from a frame.
    ///
    /// The pseudo-columns `_time`, `_worker` and `_diff` give each row its
    /// timestamp (default 2), worker (default 0) and diff (default 1).
    /// Worker ids must be non-negative; a negative `_worker` is
    /// [`TestkitError::InvalidWorker`].
    pub fn table_from_frame(
        &mut self,
        graph: &mut Graph,
        frame: Frame,
        options: &IngestOptions,
    ) -> Result<Table, TestkitError> {
        if options.id_from.is_some() && options.schema.is_some() {
            return Err(TestkitError::MutuallyExclusive("id_from", "schema"));
        }
        if let Some(schema) = &options.schema {
            check_schema(schema, &frame, &STREAM_PSEUDOCOLUMNS)?;
        }

        let id_from = resolve_id_from(options);
        let schema = match &options.schema {
            Some(schema) => schema.clone(),
            None => schema_from_frame(&frame, id_from.as_deref(), &STREAM_PSEUDOCOLUMNS)?,
        };

        let rows = frame.len();
        let times = frame
            .int_column(STREAM_TIME_COLUMN)?
            .unwrap_or_else(|| vec![FIRST_TIMESTAMP; rows]);
        let workers = frame
            .int_column(STREAM_WORKER_COLUMN)?
            .unwrap_or_else(|| vec![0; rows])
            .into_iter()
            .map(|worker| {
                WorkerId::try_from(worker).map_err(|_| TestkitError::InvalidWorker(worker))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let diffs = frame
            .int_column(STREAM_DIFF_COLUMN)?
            .unwrap_or_else(|| vec![1; rows]);
        let keys = ids_from_frame(&frame, id_from.as_deref(), options.unsafe_trusted_ids)?;

        let values = normalized_rows(&frame, &schema)?;

        let mut batches = LogicalBatches::new();
        for (n, (values, key)) in values.into_iter().zip(keys).enumerate() {
            batches
                .entry(times[n])
                .or_default()
                .entry(workers[n])
                .or_default()
                .push(Row::new(diffs[n], key, values));
        }

        self.table_from_dict(graph, batches, schema)
    }

    /// Creates a table from a markdown table definition, with the
    /// pseudo-columns of [`table_from_frame`](Self::table_from_frame).
    pub fn table_from_markdown(
        &mut self,
        graph: &mut Graph,
        definition: &str,
        options: &IngestOptions,
    ) -> Result<Table, TestkitError> {
        self.table_from_frame(graph, parse_markdown(definition)?, options)
    }

    /// Persistence configuration replaying every stream created by this
    /// generator, or `None` when it created none.
    ///
    /// The first call freezes the generator: tables cannot be added
    /// afterwards.
    pub fn persistence_config(&mut self) -> Option<PersistenceConfig> {
        let events = self.registry.freeze()?;
        Some(PersistenceConfig::simple_config(
            Backend::mock(events),
            SnapshotAccess::Replay,
            PersistenceMode::SpeedrunReplay,
        ))
    }

    pub fn registry(&self) -> &ChangeStreamRegistry {
        &self.registry
    }

    pub fn warnings(&self) -> &WarningLog {
        &self.warnings
    }
}

/// Values of `row` in schema order.
fn named_values(schema: &Schema, row: &NamedRow) -> Result<Vec<Value>, TestkitError> {
    schema
        .columns
        .iter()
        .map(|column| {
            row.get(&column.name)
                .map(|value| normalize_value(value.clone(), &column.dtype))
                .ok_or_else(|| TestkitError::MissingColumn(column.name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::{NamedRow, StreamGenerator};
    use crate::frame::Frame;
    use crate::planner::Row;
    use crate::table::{Graph, TableSource};
    use crate::test::init_test_logger;
    use feldera_testkit_types::{
        DType, IngestOptions, Key, PersistenceMode, Schema, SnapshotAccess, SnapshotEvent,
        StreamId, TestkitError, TestkitWarning, Value,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn stream_id(source: &TableSource) -> &StreamId {
        match source {
            TableSource::Replay { stream_id } => stream_id,
            other => panic!("expected a replayed table, found {other:?}"),
        }
    }

    fn named(a: i64) -> NamedRow {
        NamedRow::from([("a".to_string(), Value::Int(a))])
    }

    #[test]
    fn list_of_batches() {
        let mut graph = Graph::new();
        let mut generator = StreamGenerator::new();
        let schema = Schema::from_types([("a", DType::Int)]);
        let table = generator
            .table_from_list_of_batches(
                &mut graph,
                vec![vec![named(1), named(2)], vec![named(3)]],
                schema.clone(),
            )
            .unwrap();
        let stream = stream_id(table.source()).clone();

        let keys = (0..3).map(Key::for_sequence_number).collect::<Vec<_>>();
        assert_eq!(
            generator.registry().events(&stream, 0).unwrap(),
            &[
                SnapshotEvent::AdvanceTime(2),
                SnapshotEvent::Insert(keys[0], vec![Value::Int(1)]),
                SnapshotEvent::Insert(keys[1], vec![Value::Int(2)]),
                SnapshotEvent::AdvanceTime(4),
                SnapshotEvent::Insert(keys[2], vec![Value::Int(3)]),
            ]
        );

        // Keys keep counting across tables of one generator.
        let table = generator
            .table_from_list_of_batches(&mut graph, vec![vec![named(4)]], schema)
            .unwrap();
        let stream = stream_id(table.source()).clone();
        assert_eq!(
            generator.registry().events(&stream, 0).unwrap()[1],
            SnapshotEvent::Insert(Key::for_sequence_number(3), vec![Value::Int(4)])
        );
    }

    #[test]
    fn missing_named_column() {
        let mut graph = Graph::new();
        let mut generator = StreamGenerator::new();
        let schema = Schema::from_types([("a", DType::Int), ("b", DType::Int)]);
        assert!(matches!(
            generator.table_from_list_of_batches(&mut graph, vec![vec![named(1)]], schema),
            Err(TestkitError::MissingColumn(name)) if name == "b"
        ));
        assert_eq!(generator.registry().stream_count(), 0);
    }

    #[test]
    fn markdown_pseudo_columns() {
        let mut graph = Graph::new();
        let mut generator = StreamGenerator::new();
        let table = generator
            .table_from_markdown(
                &mut graph,
                "
                  | a  | _time | _worker | _diff
                1 | 10 | 2     | 0       | 1
                1 | 10 | 4     | 1       | -1
                2 | 20 | 4     | 1       | 1
                ",
                &IngestOptions::default(),
            )
            .unwrap();
        assert_eq!(table.column_names(), vec!["a"]);

        let stream = stream_id(table.source()).clone();
        let k1 = Key::for_value(&Value::Int(1));
        let k2 = Key::for_value(&Value::Int(2));
        assert_eq!(
            generator.registry().events(&stream, 0).unwrap(),
            &[
                SnapshotEvent::AdvanceTime(2),
                SnapshotEvent::Insert(k1, vec![Value::Int(10)]),
                SnapshotEvent::AdvanceTime(4),
            ]
        );
        assert_eq!(
            generator.registry().events(&stream, 1).unwrap(),
            &[
                SnapshotEvent::AdvanceTime(2),
                SnapshotEvent::AdvanceTime(4),
                SnapshotEvent::Delete(k1, vec![Value::Int(10)]),
                SnapshotEvent::Insert(k2, vec![Value::Int(20)]),
            ]
        );
    }

    #[test]
    fn frame_defaults() {
        let mut graph = Graph::new();
        let mut generator = StreamGenerator::new();
        let frame = Frame::from_rows(["a"], [vec![Value::Int(5)]]).unwrap();
        let table = generator
            .table_from_frame(&mut graph, frame, &IngestOptions::default())
            .unwrap();
        let stream = stream_id(table.source()).clone();
        assert_eq!(
            generator.registry().events(&stream, 0).unwrap(),
            &[
                SnapshotEvent::AdvanceTime(2),
                SnapshotEvent::Insert(Key::for_value(&Value::Int(0)), vec![Value::Int(5)]),
            ]
        );
    }

    #[test]
    fn invalid_rows_register_nothing() {
        let mut graph = Graph::new();
        let mut generator = StreamGenerator::new();
        let options = IngestOptions::default();
        assert!(matches!(
            generator.table_from_markdown(&mut graph, "a | _diff\n1 | 1\n2 | 3", &options),
            Err(TestkitError::InvalidDiff(3))
        ));
        assert!(matches!(
            generator.table_from_markdown(&mut graph, "a | _time\n1 | -4", &options),
            Err(TestkitError::NegativeTimestamp(-4))
        ));
        assert!(matches!(
            generator.table_from_markdown(&mut graph, "a | _worker\n1 | -1", &options),
            Err(TestkitError::InvalidWorker(-1))
        ));
        assert_eq!(generator.registry().stream_count(), 0);
        assert!(generator.persistence_config().is_none());
    }

    #[test]
    fn timestamp_warnings() {
        init_test_logger();
        let mut graph = Graph::new();
        let mut generator = StreamGenerator::new();
        let schema = Schema::from_types([("a", DType::Int)]);
        let key = Key::from_raw(1);
        let batches = BTreeMap::from([
            (0, BTreeMap::from([(0, vec![Row::insert(key, vec![Value::Int(1)])])])),
            (3, BTreeMap::from([(0, vec![Row::delete(key, vec![Value::Int(1)])])])),
        ]);
        let table = generator.table_from_dict(&mut graph, batches, schema).unwrap();
        assert_eq!(
            generator.warnings().as_slice(),
            &[
                TestkitWarning::BackfillTimestamp,
                TestkitWarning::OddTimestampsDoubled
            ]
        );
        let stream = stream_id(table.source()).clone();
        assert_eq!(
            generator.registry().events(&stream, 0).unwrap()[2],
            SnapshotEvent::AdvanceTime(6)
        );
    }

    #[test]
    fn persistence_config_freezes() {
        let mut graph = Graph::new();
        let mut generator = StreamGenerator::new();
        let schema = Schema::from_types([("a", DType::Int)]);
        let table = generator
            .table_from_list_of_batches(&mut graph, vec![vec![named(1)]], schema.clone())
            .unwrap();

        let config = generator.persistence_config().unwrap();
        assert_eq!(config.snapshot_access(), SnapshotAccess::Replay);
        assert_eq!(config.persistence_mode(), PersistenceMode::SpeedrunReplay);
        let events = config.mock_events().unwrap();
        assert_eq!(
            events.get(stream_id(table.source()), 0).unwrap().len(),
            2
        );

        assert!(matches!(
            generator.table_from_list_of_batches(&mut graph, vec![vec![named(2)]], schema),
            Err(TestkitError::RegistryFrozen)
        ));
    }
}
