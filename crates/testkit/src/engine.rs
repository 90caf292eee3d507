//! The seam between the test kit and the engine that runs the graph.

use crate::table::Table;
use anyhow::anyhow;
use feldera_testkit_types::{
    CapturedStream, MonitoringLevel, PersistenceConfig, RunOptions, TestkitError,
};
use tracing::debug;

/// Runs the dataflow graph and captures the full output of some tables.
pub trait Engine {
    /// Runs the graph to completion and returns, for each of `tables` in
    /// order, every update the table went through.
    fn run_tables(
        &self,
        tables: &[&Table],
        options: &RunOptions,
    ) -> anyhow::Result<Vec<CapturedStream>>;
}

/// Computes single tables on an engine.
///
/// Every capture is a separate, blocking run of the graph in debug mode
/// with monitoring off.  Engine failures are returned as they are.
pub struct OutputCapturer<'a, E: ?Sized> {
    engine: &'a E,
    persistence_config: Option<PersistenceConfig>,
}

impl<'a, E> OutputCapturer<'a, E>
where
    E: Engine + ?Sized,
{
    /// `persistence_config` is passed to every run; it is required for
    /// tables created by a [`StreamGenerator`](crate::StreamGenerator).
    pub fn new(engine: &'a E, persistence_config: Option<PersistenceConfig>) -> Self {
        Self {
            engine,
            persistence_config,
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            debug: true,
            monitoring_level: MonitoringLevel::None,
            persistence_config: self.persistence_config.clone(),
        }
    }

    pub fn capture(&self, table: &Table) -> Result<CapturedStream, TestkitError> {
        debug!(
            "capturing table with columns {:?} in {}",
            table.column_names(),
            table.universe()
        );
        let mut captured = self.engine.run_tables(&[table], &self.run_options())?;
        match (captured.pop(), captured.is_empty()) {
            (Some(stream), true) => {
                debug!("captured {} updates", stream.len());
                Ok(stream)
            }
            (stream, _) => Err(TestkitError::Engine(anyhow!(
                "engine returned {} captured streams for a single table",
                captured.len() + usize::from(stream.is_some())
            ))),
        }
    }
}
