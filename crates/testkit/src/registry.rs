//! Append-only store of synthetic change streams.
//!
//! The registry is written while tables are defined and frozen when the
//! persistence configuration is handed to the engine.  From then on it is
//! read-only: the engine replays exactly what was appended, per worker, in
//! append order.

use crate::encoder::encode;
use crate::planner::PlannedBatches;
use feldera_testkit_types::{
    MockEvents, SnapshotEvent, StreamId, TestkitError, Timestamp, WorkerId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
enum Phase {
    Writable(BTreeMap<(StreamId, WorkerId), Vec<SnapshotEvent>>),
    Frozen(Arc<MockEvents>),
}

impl Default for Phase {
    fn default() -> Self {
        Self::Writable(BTreeMap::new())
    }
}

#[derive(Debug, Default)]
pub struct ChangeStreamRegistry {
    streams: u64,
    phase: Phase,
}

impl ChangeStreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn events_mut(
        &mut self,
    ) -> Result<&mut BTreeMap<(StreamId, WorkerId), Vec<SnapshotEvent>>, TestkitError> {
        match &mut self.phase {
            Phase::Writable(events) => Ok(events),
            Phase::Frozen(_) => Err(TestkitError::RegistryFrozen),
        }
    }

    /// Allocates a new stream id, unique within this registry.
    pub fn begin_stream(&mut self) -> Result<StreamId, TestkitError> {
        self.events_mut()?;
        let stream_id = StreamId::for_sequence_number(self.streams);
        self.streams += 1;
        Ok(stream_id)
    }

    pub fn append_advance_time(
        &mut self,
        stream_id: &StreamId,
        worker: WorkerId,
        timestamp: Timestamp,
    ) -> Result<(), TestkitError> {
        self.append_event(stream_id, worker, SnapshotEvent::advance_time(timestamp))
    }

    pub fn append_event(
        &mut self,
        stream_id: &StreamId,
        worker: WorkerId,
        event: SnapshotEvent,
    ) -> Result<(), TestkitError> {
        self.events_mut()?
            .entry((stream_id.clone(), worker))
            .or_default()
            .push(event);
        Ok(())
    }

    /// Writes `planned` as a new stream.
    ///
    /// For each timestamp in ascending order, every worker of the stream
    /// first receives an advance-time barrier, then each worker receives its
    /// rows for that timestamp in the given order.
    pub fn register(&mut self, planned: &PlannedBatches) -> Result<StreamId, TestkitError> {
        let stream_id = self.begin_stream()?;
        for (timestamp, batch) in planned.batches() {
            for &worker in planned.workers() {
                self.append_advance_time(&stream_id, worker, timestamp)?;
            }
            for (&worker, rows) in batch {
                for row in rows {
                    let event = encode(row.polarity, row.key, row.values.clone());
                    self.append_event(&stream_id, worker, event)?;
                }
            }
        }
        debug!(
            "registered stream {stream_id} with {} timestamps on {} workers",
            planned.timestamps().count(),
            planned.workers().len()
        );
        Ok(stream_id)
    }

    /// Number of streams begun so far.
    pub fn stream_count(&self) -> u64 {
        self.streams
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.phase, Phase::Frozen(_))
    }

    /// Ends the write phase and returns the recorded events, or `None` when
    /// no stream was ever begun.  Freezing twice returns the same events.
    pub fn freeze(&mut self) -> Option<Arc<MockEvents>> {
        match &mut self.phase {
            Phase::Frozen(events) => Some(events.clone()),
            Phase::Writable(_) if self.streams == 0 => None,
            Phase::Writable(events) => {
                let events = Arc::new(MockEvents::new(std::mem::take(events)));
                info!(
                    "freezing {} synthetic streams ({} worker logs)",
                    self.streams,
                    events.len()
                );
                self.phase = Phase::Frozen(events.clone());
                Some(events)
            }
        }
    }

    /// Events of a stream and worker recorded so far.
    pub fn events(&self, stream_id: &StreamId, worker: WorkerId) -> Option<&[SnapshotEvent]> {
        match &self.phase {
            Phase::Writable(events) => events
                .get(&(stream_id.clone(), worker))
                .map(Vec::as_slice),
            Phase::Frozen(events) => events.get(stream_id, worker),
        }
    }
}
