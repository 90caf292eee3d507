//! Table handles and the graph-building session that mints them.

use crate::cache::StaticTableCache;
use crate::warnings::WarningLog;
use feldera_testkit_types::{Key, Polarity, Schema, StreamId, Timestamp, Value};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Row-identity space of a table.  Tables in the same universe have the same
/// set of keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UniverseId(u64);

impl Display for UniverseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "universe#{}", self.0)
    }
}

/// A row of a static table.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticRow {
    pub key: Key,
    pub values: Vec<Value>,
    pub time: Timestamp,
    pub polarity: Polarity,
}

/// Where the contents of a table come from.
#[derive(Clone, Debug, PartialEq)]
pub enum TableSource {
    /// Rows known when the graph is built.
    Static(Vec<StaticRow>),

    /// Rows replayed from a synthetic change stream through the persistence
    /// layer.
    Replay { stream_id: StreamId },
}

/// Handle to an input table of the graph under test.
#[derive(Clone, Debug)]
pub struct Table {
    schema: Arc<Schema>,
    universe: UniverseId,
    source: Arc<TableSource>,
}

impl Table {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.column_names()
    }

    pub fn universe(&self) -> UniverseId {
        self.universe
    }

    pub fn source(&self) -> &TableSource {
        &self.source
    }

    /// The same table, asserted to share the row-identity space of `other`.
    pub fn with_universe_of(&self, other: &Table) -> Self {
        Self {
            universe: other.universe,
            ..self.clone()
        }
    }

    pub fn is_same_universe(&self, other: &Table) -> bool {
        self.universe == other.universe
    }
}

/// State of one graph-building session: the universe allocator, the static
/// table cache and the warnings raised while building.
#[derive(Debug, Default)]
pub struct Graph {
    next_universe: u64,
    static_tables: StaticTableCache,
    warnings: WarningLog,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table in a fresh universe.
    pub fn new_table(&mut self, schema: Schema, source: TableSource) -> Table {
        let universe = UniverseId(self.next_universe);
        self.next_universe += 1;
        Table {
            schema: Arc::new(schema),
            universe,
            source: Arc::new(source),
        }
    }

    pub fn static_tables(&self) -> &StaticTableCache {
        &self.static_tables
    }

    pub(crate) fn static_tables_mut(&mut self) -> &mut StaticTableCache {
        &mut self.static_tables
    }

    pub fn warnings(&self) -> &WarningLog {
        &self.warnings
    }

    pub(crate) fn warnings_mut(&mut self) -> &mut WarningLog {
        &mut self.warnings
    }
}

#[cfg(test)]
mod test {
    use super::{Graph, TableSource};
    use feldera_testkit_types::{DType, Schema};

    #[test]
    fn every_table_gets_a_fresh_universe() {
        let mut graph = Graph::new();
        let schema = Schema::from_types([("a", DType::Int)]);
        let a = graph.new_table(schema.clone(), TableSource::Static(Vec::new()));
        let b = graph.new_table(schema, TableSource::Static(Vec::new()));
        assert!(!a.is_same_universe(&b));

        let c = b.with_universe_of(&a);
        assert!(c.is_same_universe(&a));
        assert_eq!(c.source(), b.source());
    }
}
