use serde::{Serialize, Serializer};
use std::borrow::Cow;
use thiserror::Error;

/// An error raised while building test tables or canonicalizing output.
///
/// Everything except [`TestkitError::Engine`] is a problem with the test
/// definition itself and is raised before any event is registered.
#[derive(Error, Debug, Serialize)]
pub enum TestkitError {
    /// Two parameters that cannot be combined were both supplied.
    #[error("parameters `{0}` and `{1}` are mutually exclusive")]
    MutuallyExclusive(&'static str, &'static str),

    /// Columns of the supplied schema differ from the columns of the data.
    #[error("schema does not match given data: schema has columns {expected:?}, data has {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("negative timestamp cannot be used: {0}")]
    NegativeTimestamp(i64),

    /// Doubling an odd-timestamped table pushes a timestamp out of range.
    #[error("timestamp {0} is too large to be doubled")]
    TimestampOverflow(i64),

    #[error("only diffs of 1 and -1 are supported, found {0}")]
    InvalidDiff(i64),

    /// A time, diff or worker pseudo-column holds something other than
    /// integers.
    #[error("column {0} has to contain integers only")]
    NonIntegerPseudoColumn(String),

    #[error("worker ids cannot be negative: {0}")]
    InvalidWorker(i64),

    #[error("column {0:?} is missing")]
    MissingColumn(String),

    /// Malformed markdown table definition.
    #[error("line {line} of table definition: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A stream was added after the persistence configuration had been
    /// handed to the engine.
    #[error("stream registry is frozen: no stream can be added after the persistence config was created")]
    RegistryFrozen,

    /// Updates for a key do not net out to at most one row.
    #[error("updates for key {key} do not squash to a single row ({rows} rows remain)")]
    InconsistentUpdates { key: String, rows: usize },

    /// Failure of the engine itself; propagated unchanged.
    #[error(transparent)]
    #[serde(serialize_with = "serialize_engine_error")]
    Engine(#[from] anyhow::Error),
}

fn serialize_engine_error<S>(error: &anyhow::Error, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{error:#}"))
}

impl TestkitError {
    /// Identifying name of the error.
    pub fn error_code(&self) -> Cow<'static, str> {
        let code = match self {
            Self::MutuallyExclusive(..) => "MutuallyExclusive",
            Self::SchemaMismatch { .. } => "SchemaMismatch",
            Self::NegativeTimestamp(_) => "NegativeTimestamp",
            Self::TimestampOverflow(_) => "TimestampOverflow",
            Self::InvalidDiff(_) => "InvalidDiff",
            Self::NonIntegerPseudoColumn(_) => "NonIntegerPseudoColumn",
            Self::InvalidWorker(_) => "InvalidWorker",
            Self::MissingColumn(_) => "MissingColumn",
            Self::Parse { .. } => "ParseError",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::RegistryFrozen => "RegistryFrozen",
            Self::InconsistentUpdates { .. } => "InconsistentUpdates",
            Self::Engine(_) => "EngineError",
        };
        Cow::from(code)
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
