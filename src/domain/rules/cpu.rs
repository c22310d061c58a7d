use crate::domain::entities::alert::CpuAlert;
use crate::domain::entities::sample::Sample;
use crate::domain::value_objects::thresholds::AlertThreshold;

/// Returns `true` iff the sample's CPU usage is strictly above the threshold.
///
/// Memory and disk never participate. Pure: no I/O, no logging.
#[must_use]
pub fn should_alert(sample: &Sample, threshold: AlertThreshold) -> bool {
    sample.cpu_pct > threshold.percent()
}

/// Wraps [`should_alert`] and builds the alert payload when it fires.
pub struct CpuThresholdRule {
    threshold: AlertThreshold,
}

impl CpuThresholdRule {
    #[must_use]
    pub const fn new(threshold: AlertThreshold) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        "cpu_threshold"
    }

    #[must_use]
    pub const fn threshold(&self) -> AlertThreshold {
        self.threshold
    }

    #[must_use]
    pub fn evaluate(&self, sample: &Sample) -> Option<CpuAlert> {
        should_alert(sample, self.threshold)
            .then(|| CpuAlert::from_sample(sample, self.threshold.percent()))
    }
}
