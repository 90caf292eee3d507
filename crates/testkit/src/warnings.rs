use feldera_testkit_types::TestkitWarning;
use tracing::warn;

/// Non-fatal channel for recoverable anomalies.
///
/// Every warning is logged through `tracing` and kept, so tests can assert
/// on what was reported.
#[derive(Clone, Debug, Default)]
pub struct WarningLog {
    warnings: Vec<TestkitWarning>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, warning: TestkitWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = TestkitWarning>) {
        for warning in warnings {
            self.emit(warning);
        }
    }

    pub fn as_slice(&self) -> &[TestkitWarning] {
        &self.warnings
    }

    pub fn contains(&self, warning: &TestkitWarning) -> bool {
        self.warnings.contains(warning)
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
