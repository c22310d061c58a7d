use thiserror::Error;

use crate::domain::entities::sample::Sample;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("health log write failed: {0}")]
    LogWriteError(String),
    #[error("health log read failed: {0}")]
    LogReadError(String),
}

/// Append-only history of samples.
pub trait HealthLog: Send + Sync {
    /// Append one row for `sample`, creating the log if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LogWriteError` on any I/O failure.
    fn append(&self, sample: &Sample) -> Result<(), StoreError>;

    /// Read every parseable row, ordered by ascending timestamp.
    ///
    /// Rows that cannot be parsed are skipped, never rewritten. A missing or
    /// empty log yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LogReadError` if an existing log cannot be read.
    fn read_all(&self) -> Result<Vec<Sample>, StoreError>;
}
