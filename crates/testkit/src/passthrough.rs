//! An engine that outputs its input tables unchanged.

use crate::engine::Engine;
use crate::table::{Table, TableSource};
use anyhow::{anyhow, ensure, Result as AnyResult};
use feldera_testkit_types::{
    CapturedRow, CapturedStream, PersistenceConfig, PersistenceMode, RunOptions, SnapshotAccess,
    SnapshotEvent, StreamId,
};
use tracing::trace;

/// Reference [`Engine`] whose output tables are its input tables.
///
/// Static tables produce their rows at their own timestamps.  Replayed
/// tables read their change streams from the mock backend of the
/// persistence configuration, worker by worker: an advance-time event sets
/// the time of the updates that follow it.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughEngine;

impl Engine for PassthroughEngine {
    fn run_tables(&self, tables: &[&Table], options: &RunOptions) -> AnyResult<Vec<CapturedStream>> {
        tables
            .iter()
            .map(|table| match table.source() {
                TableSource::Static(rows) => Ok(rows
                    .iter()
                    .map(|row| {
                        CapturedRow::new(row.key, row.values.clone(), row.time, row.polarity.diff())
                    })
                    .collect()),
                TableSource::Replay { stream_id } => {
                    replay(stream_id, options.persistence_config.as_ref())
                }
            })
            .collect()
    }
}

fn replay(stream_id: &StreamId, config: Option<&PersistenceConfig>) -> AnyResult<CapturedStream> {
    let config = config.ok_or_else(|| {
        anyhow!("stream {stream_id} can only be replayed with a persistence config")
    })?;
    ensure!(
        config.snapshot_access() == SnapshotAccess::Replay
            && config.persistence_mode() == PersistenceMode::SpeedrunReplay,
        "stream {stream_id} requires replay access in speedrun replay mode, found {:?} access in {:?} mode",
        config.snapshot_access(),
        config.persistence_mode()
    );
    let events = config
        .mock_events()
        .ok_or_else(|| anyhow!("persistence backend has no recorded events"))?;

    let mut captured = Vec::new();
    for worker in events.workers(stream_id) {
        let mut time = 0;
        for event in events.get(stream_id, worker).unwrap_or_default() {
            match event {
                SnapshotEvent::AdvanceTime(timestamp) => time = *timestamp,
                SnapshotEvent::Insert(key, values) => {
                    captured.push(CapturedRow::new(*key, values.clone(), time, 1))
                }
                SnapshotEvent::Delete(key, values) => {
                    captured.push(CapturedRow::new(*key, values.clone(), time, -1))
                }
            }
        }
        trace!("replayed worker {worker} of stream {stream_id}");
    }
    Ok(captured)
}
