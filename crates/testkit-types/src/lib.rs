//! Public types shared by the Feldera test kit.
//!
//! The test kit drives a computation from declaratively specified input
//! tables and canonicalizes whatever the computation produces.  This crate
//! holds the data model both halves agree on: typed scalar [`Value`]s and
//! row identities ([`Key`]), the [`SnapshotEvent`]s replayed by the mock
//! persistence backend, the rows captured from the engine, schemas,
//! configuration and errors.

pub mod config;
pub mod error;
pub mod event;
pub mod key;
pub mod persistence;
pub mod schema;
pub mod value;
pub mod warning;

pub use config::{IngestOptions, MonitoringLevel, PrintOptions, RunOptions};
pub use error::TestkitError;
pub use event::{
    CapturedRow, CapturedStream, Polarity, SnapshotEvent, StreamId, Timestamp, WorkerId,
};
pub use key::Key;
pub use persistence::{Backend, MockEvents, PersistenceConfig, PersistenceMode, SnapshotAccess};
pub use schema::{ColumnSchema, DType, Schema};
pub use value::Value;
pub use warning::TestkitWarning;

/// Name of the time pseudo-column recognized by static table ingestion.
pub const TIME_PSEUDOCOLUMN: &str = "__time__";

/// Name of the diff pseudo-column recognized by static table ingestion.
pub const DIFF_PSEUDOCOLUMN: &str = "__diff__";

/// Pseudo-columns of the static ingestion path, in the order they are
/// appended to update streams.
pub const FRAME_PSEUDOCOLUMNS: [&str; 2] = [TIME_PSEUDOCOLUMN, DIFF_PSEUDOCOLUMN];

/// Pseudo-columns recognized by the stream generator.
pub const STREAM_TIME_COLUMN: &str = "_time";
pub const STREAM_WORKER_COLUMN: &str = "_worker";
pub const STREAM_DIFF_COLUMN: &str = "_diff";

pub const STREAM_PSEUDOCOLUMNS: [&str; 3] =
    [STREAM_TIME_COLUMN, STREAM_WORKER_COLUMN, STREAM_DIFF_COLUMN];
