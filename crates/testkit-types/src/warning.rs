use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// A recoverable anomaly in a test table definition.
///
/// Warnings never stop table construction; the test kit applies the
/// documented corrective transform (if any) and continues.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TestkitWarning {
    /// Rows at time 0 are backfilled during replay and never flow through
    /// the incremental pipeline.
    BackfillTimestamp,

    /// Some timestamp was odd; every timestamp of the table was doubled.
    OddTimestampsDoubled,

    Deprecated {
        name: &'static str,
        replacement: &'static str,
    },
}

impl Display for TestkitWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackfillTimestamp => f.write_str(
                "rows with timestamp 0 are only backfilled and are not processed by output connectors",
            ),
            Self::OddTimestampsDoubled => {
                f.write_str("timestamps are required to be even; all timestamps will be doubled")
            }
            Self::Deprecated { name, replacement } => {
                write!(f, "{name} is deprecated, use {replacement} instead")
            }
        }
    }
}
