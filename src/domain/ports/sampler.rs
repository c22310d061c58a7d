use thiserror::Error;

use crate::domain::entities::sample::Sample;

#[derive(Error, Debug)]
pub enum SamplingError {
    #[error("system metrics provider unavailable: {0}")]
    ProviderUnavailable(String),
}

pub trait MetricSampler: Send + Sync {
    /// Take one reading of CPU, memory and disk utilization.
    ///
    /// The CPU figure is measured over a fixed, non-zero window, so this call
    /// blocks the current thread for that long.
    ///
    /// # Errors
    ///
    /// Returns `SamplingError::ProviderUnavailable` if the OS metrics cannot
    /// be read.
    fn sample(&self) -> Result<Sample, SamplingError>;
}
