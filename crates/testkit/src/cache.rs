use crate::fingerprint::Fingerprint;
use crate::table::Table;
use std::collections::HashMap;
use tracing::debug;

/// Static tables built during a session, by content fingerprint.
///
/// Entries are never evicted.
#[derive(Debug, Default)]
pub struct StaticTableCache {
    tables: HashMap<Fingerprint, Table>,
}

impl StaticTableCache {
    /// Returns `table` itself when no table with the same fingerprint was
    /// built before, and `table` moved onto the universe of the earlier
    /// table otherwise.
    pub fn get_or_insert(&mut self, fingerprint: Fingerprint, table: Table) -> Table {
        match self.tables.get(&fingerprint) {
            Some(cached) => {
                debug!(
                    "static table {fingerprint:?} already built, reusing {}",
                    cached.universe()
                );
                table.with_universe_of(cached)
            }
            None => {
                self.tables.insert(fingerprint, table.clone());
                table
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
