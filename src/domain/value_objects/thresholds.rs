use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CPU_ALERT_PERCENT: f64 = 80.0;

#[derive(Error, Debug, PartialEq)]
pub enum ThresholdError {
    #[error("alert threshold must be a percentage in [0, 100], got {0}")]
    OutOfRange(f64),
}

/// CPU usage percentage above which an alert fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct AlertThreshold(f64);

impl AlertThreshold {
    /// # Errors
    ///
    /// Returns `ThresholdError::OutOfRange` if `percent` is not finite or
    /// falls outside `[0, 100]`.
    pub fn new(percent: f64) -> Result<Self, ThresholdError> {
        if percent.is_finite() && (0.0..=100.0).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(ThresholdError::OutOfRange(percent))
        }
    }

    #[must_use]
    pub const fn percent(self) -> f64 {
        self.0
    }
}

impl Default for AlertThreshold {
    fn default() -> Self {
        Self(DEFAULT_CPU_ALERT_PERCENT)
    }
}

impl TryFrom<f64> for AlertThreshold {
    type Error = ThresholdError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AlertThreshold> for f64 {
    fn from(threshold: AlertThreshold) -> Self {
        threshold.0
    }
}
