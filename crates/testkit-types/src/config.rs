//! Test kit configuration.
//!
//! Options are plain `serde` structures so that suites can keep them next to
//! their fixtures as YAML or JSON.

use crate::error::TestkitError;
use crate::persistence::PersistenceConfig;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// Default value of [`PrintOptions::include_id`].
pub const fn default_include_id() -> bool {
    true
}

/// Default value of [`PrintOptions::short_pointers`].
pub const fn default_short_pointers() -> bool {
    true
}

/// Maximal number of characters of a row identity shown when
/// [`PrintOptions::short_pointers`] is set.
pub const SHORT_POINTER_LENGTH: usize = 8;

/// How computed tables are printed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Show row identities in the first column.
    #[serde(default = "default_include_id")]
    pub include_id: bool,

    /// Abbreviate row identities to their first
    /// [`SHORT_POINTER_LENGTH`] characters.
    #[serde(default = "default_short_pointers")]
    pub short_pointers: bool,

    /// Print at most this many rows; all rows when unset.
    #[serde(default)]
    pub n_rows: Option<usize>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            include_id: default_include_id(),
            short_pointers: default_short_pointers(),
            n_rows: None,
        }
    }
}

impl PrintOptions {
    pub fn from_yaml(yaml: &str) -> Result<Self, TestkitError> {
        serde_yaml::from_str(yaml).map_err(|e| TestkitError::InvalidConfig(e.to_string()))
    }

    pub fn with_include_id(self, include_id: bool) -> Self {
        Self { include_id, ..self }
    }

    pub fn with_short_pointers(self, short_pointers: bool) -> Self {
        Self {
            short_pointers,
            ..self
        }
    }

    pub fn with_n_rows(self, n_rows: Option<usize>) -> Self {
        Self { n_rows, ..self }
    }
}

/// How a table definition is turned into a table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Columns whose values define row identity.  Mutually exclusive with
    /// `schema`.
    #[serde(default)]
    pub id_from: Option<Vec<String>>,

    /// Use identity values found in the data as-is instead of hashing them.
    #[serde(default)]
    pub unsafe_trusted_ids: bool,

    /// Explicit schema; inferred from the data when unset.
    #[serde(default)]
    pub schema: Option<Schema>,
}

impl IngestOptions {
    pub fn from_yaml(yaml: &str) -> Result<Self, TestkitError> {
        serde_yaml::from_str(yaml).map_err(|e| TestkitError::InvalidConfig(e.to_string()))
    }

    pub fn with_id_from<S: Into<String>>(self, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            id_from: Some(columns.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    pub fn with_unsafe_trusted_ids(self, unsafe_trusted_ids: bool) -> Self {
        Self {
            unsafe_trusted_ids,
            ..self
        }
    }

    pub fn with_schema(self, schema: Schema) -> Self {
        Self {
            schema: Some(schema),
            ..self
        }
    }
}

/// Amount of monitoring output the engine produces while running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringLevel {
    #[default]
    None,
    InOut,
    All,
}

/// Options of a single engine run.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub debug: bool,
    pub monitoring_level: MonitoringLevel,
    pub persistence_config: Option<PersistenceConfig>,
}

#[cfg(test)]
mod test {
    use super::{IngestOptions, MonitoringLevel, PrintOptions};
    use pretty_assertions::assert_eq;

    #[test]
    fn print_options_defaults() {
        assert_eq!(PrintOptions::from_yaml("{}").unwrap(), PrintOptions::default());
        assert_eq!(
            PrintOptions::from_yaml("include_id: false\nn_rows: 3").unwrap(),
            PrintOptions {
                include_id: false,
                short_pointers: true,
                n_rows: Some(3),
            }
        );
        assert!(PrintOptions::from_yaml("include_id: maybe").is_err());
    }

    #[test]
    fn ingest_options_from_yaml() {
        let options = IngestOptions::from_yaml("id_from: [a, b]").unwrap();
        assert_eq!(
            options,
            IngestOptions::default().with_id_from(["a", "b"])
        );
    }

    #[test]
    fn monitoring_level_serde() {
        let level: MonitoringLevel = serde_json::from_str("\"in_out\"").unwrap();
        assert_eq!(level, MonitoringLevel::InOut);
    }
}
