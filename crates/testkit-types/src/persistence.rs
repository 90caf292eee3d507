//! Persistence configuration consumed by the engine.
//!
//! Synthetic streams reach the engine through its persistence layer: the
//! events are stored in an in-memory mock backend and the engine is told to
//! replay them as fast as possible, as if they had been recorded from a real
//! source.

use crate::event::{SnapshotEvent, StreamId, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Events of every synthetic stream, keyed by stream and worker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MockEvents {
    events: BTreeMap<(StreamId, WorkerId), Vec<SnapshotEvent>>,
}

impl MockEvents {
    pub fn new(events: BTreeMap<(StreamId, WorkerId), Vec<SnapshotEvent>>) -> Self {
        Self { events }
    }

    pub fn get(&self, stream: &StreamId, worker: WorkerId) -> Option<&[SnapshotEvent]> {
        self.events
            .get(&(stream.clone(), worker))
            .map(Vec::as_slice)
    }

    /// Workers that have an event list for `stream`, in ascending order.
    pub fn workers<'a>(&'a self, stream: &'a StreamId) -> impl Iterator<Item = WorkerId> + 'a {
        self.events
            .keys()
            .filter(move |(id, _)| id == stream)
            .map(|(_, worker)| *worker)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Clone, Debug)]
pub enum Backend {
    /// Events held in memory; nothing is written anywhere.
    Mock(Arc<MockEvents>),
}

impl Backend {
    pub fn mock(events: Arc<MockEvents>) -> Self {
        Self::Mock(events)
    }
}

/// How the engine accesses stored snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotAccess {
    /// Read stored snapshots, do not record new ones.
    Replay,
    /// Record snapshots, do not read them.
    Record,
    /// Read and record.
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    Batch,
    Persisting,
    /// Replay stored snapshots as fast as possible, respecting their
    /// advance-time boundaries.
    SpeedrunReplay,
}

/// Sealed persistence configuration handed to the engine.
#[derive(Clone, Debug)]
pub struct PersistenceConfig {
    backend: Backend,
    snapshot_access: SnapshotAccess,
    persistence_mode: PersistenceMode,
}

impl PersistenceConfig {
    pub fn simple_config(
        backend: Backend,
        snapshot_access: SnapshotAccess,
        persistence_mode: PersistenceMode,
    ) -> Self {
        Self {
            backend,
            snapshot_access,
            persistence_mode,
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn snapshot_access(&self) -> SnapshotAccess {
        self.snapshot_access
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        self.persistence_mode
    }

    pub fn mock_events(&self) -> Option<&MockEvents> {
        match &self.backend {
            Backend::Mock(events) => Some(events),
        }
    }
}
