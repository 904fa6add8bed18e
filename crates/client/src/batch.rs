//! Aggregate result reporting for bulk operations.

/// Outcome of a bulk operation over many items.
///
/// Bulk operations never stop at the first failure; every item is
/// attempted and failures are collected here per item.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Number of items the operation was asked to process.
    pub attempted: usize,
    /// Number of items that succeeded.
    pub succeeded: usize,
    /// The items that failed, with the failure reason.
    pub failures: Vec<(String, String)>,
}

impl BatchOutcome {
    /// Start an outcome for a batch of `attempted` items.
    #[must_use]
    pub fn new(attempted: usize) -> Self {
        Self {
            attempted,
            ..Self::default()
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub(crate) fn record_failure(&mut self, item: impl Into<String>, reason: impl Into<String>) {
        self.failures.push((item.into(), reason.into()));
    }

    /// True when every attempted item succeeded.
    #[must_use]
    pub fn is_full_success(&self) -> bool {
        self.succeeded == self.attempted && self.failures.is_empty()
    }

    /// Short human-readable summary, e.g. `"2/3 succeeded, 1 failed"`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_full_success() {
            format!("{}/{} succeeded", self.succeeded, self.attempted)
        } else {
            format!(
                "{}/{} succeeded, {} failed",
                self.succeeded,
                self.attempted,
                self.failures.len()
            )
        }
    }
}
