//! Deterministic input and output for testing computations.
//!
//! Input tables are declared in code or as markdown, either as static
//! tables or as synthetic change streams produced by a [`StreamGenerator`]
//! and replayed by the engine through its persistence layer.  Output tables
//! are captured through an [`Engine`], squashed to their final state or
//! kept as an update stream, and put in a canonical order so they can be
//! compared and printed reproducibly.

pub mod cache;
pub mod compare;
pub mod encoder;
pub mod engine;
pub mod fingerprint;
pub mod frame;
pub mod generator;
pub mod ids;
pub mod ingest;
pub mod markdown;
pub mod output;
pub mod passthrough;
pub mod planner;
pub mod print;
pub mod registry;
pub mod schema;
pub mod squash;
pub mod table;
pub mod warnings;

#[cfg(test)]
mod test;

pub use cache::StaticTableCache;
pub use compare::{compare_rows, compare_values, sort_best_effort, Unorderable};
pub use engine::{Engine, OutputCapturer};
pub use fingerprint::Fingerprint;
pub use frame::Frame;
pub use generator::{NamedRow, StreamGenerator};
#[allow(deprecated)]
pub use ingest::{parse_to_table, table_from_frame, table_from_markdown};
pub use markdown::parse_markdown;
pub use output::{table_to_dicts, table_to_frame, ColumnData};
pub use passthrough::PassthroughEngine;
pub use planner::{plan_batches, LogicalBatches, PlannedBatches, Row};
pub use print::{
    compute_and_print, compute_and_print_update_stream, compute_and_render,
    compute_and_render_update_stream,
};
pub use registry::ChangeStreamRegistry;
pub use squash::squash_updates;
pub use table::{Graph, StaticRow, Table, TableSource, UniverseId};
pub use warnings::WarningLog;

pub use feldera_testkit_types as types;
