use thiserror::Error;

use super::notifier::{DeliveryOutcome, Notifier};
use super::report::{report_subject, ReportBuilder, REPORT_BODY};
use crate::domain::entities::sample::Sample;
use crate::domain::ports::mailer::DeliveryError;
use crate::domain::ports::renderer::RenderError;
use crate::domain::ports::sampler::{MetricSampler, SamplingError};
use crate::domain::ports::store::{HealthLog, StoreError};
use crate::domain::rules::CpuThresholdRule;

/// A failure that stops the run. Delivery failures are not among them.
///
/// The message names the stage; the cause is the error source.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("sampling stage failed")]
    Sampling(#[from] SamplingError),
    #[error("logging stage failed")]
    LogWrite(#[from] StoreError),
    #[error("report stage failed")]
    Render(#[from] RenderError),
}

/// Result of one delivery attempt, or why none was made.
#[derive(Debug)]
pub enum DeliveryStatus {
    /// Delivery is switched off for this run.
    Disabled,
    /// Nothing to deliver (no alert fired).
    NotNeeded,
    Done(DeliveryOutcome),
    Failed(DeliveryError),
}

impl DeliveryStatus {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    fn from_result(result: Result<DeliveryOutcome, DeliveryError>) -> Self {
        match result {
            Ok(outcome) => Self::Done(outcome),
            Err(e) => Self::Failed(e),
        }
    }
}

/// What a completed run did.
#[derive(Debug)]
pub struct RunSummary {
    pub sample: Sample,
    pub alert_fired: bool,
    pub alert: DeliveryStatus,
    pub history_len: usize,
    pub report: DeliveryStatus,
}

impl RunSummary {
    /// True when the alert or the report could not be delivered.
    #[must_use]
    pub const fn delivery_failed(&self) -> bool {
        self.alert.is_failure() || self.report.is_failure()
    }
}

/// Runs the pipeline once: sample, alert, append, read back, report, deliver.
pub struct ProbeService<'a> {
    sampler: &'a dyn MetricSampler,
    log: &'a dyn HealthLog,
    rule: CpuThresholdRule,
    reports: ReportBuilder<'a>,
    notifier: Option<Notifier<'a>>,
    os_name: String,
}

impl<'a> ProbeService<'a> {
    /// `notifier` is `None` when mail delivery is disabled; the report is
    /// then built and left on disk.
    #[must_use]
    pub fn new(
        sampler: &'a dyn MetricSampler,
        log: &'a dyn HealthLog,
        rule: CpuThresholdRule,
        reports: ReportBuilder<'a>,
        notifier: Option<Notifier<'a>>,
        os_name: impl Into<String>,
    ) -> Self {
        Self {
            sampler,
            log,
            rule,
            reports,
            notifier,
            os_name: os_name.into(),
        }
    }

    /// Run a single probe cycle.
    ///
    /// The alert goes out before the log write, so it fires even if the
    /// report path fails later.
    ///
    /// # Errors
    ///
    /// Returns `RunError` if sampling, the log append or rendering fails.
    /// Delivery failures are reported in the returned [`RunSummary`].
    pub fn run_once(&self) -> Result<RunSummary, RunError> {
        let sample = self.sampler.sample()?;
        tracing::info!(
            cpu = sample.cpu_pct,
            mem = sample.mem_pct,
            disk = sample.disk_pct,
            "sample taken"
        );

        let cpu_alert = self.rule.evaluate(&sample);
        let alert_fired = cpu_alert.is_some();
        let alert = match cpu_alert {
            Some(cpu_alert) => {
                tracing::warn!(
                    cpu = sample.cpu_pct,
                    threshold = self.rule.threshold().percent(),
                    "CPU above alert threshold"
                );
                self.notifier.as_ref().map_or(DeliveryStatus::Disabled, |n| {
                    DeliveryStatus::from_result(n.send_alert(&cpu_alert))
                })
            }
            None => {
                tracing::debug!("CPU within threshold");
                DeliveryStatus::NotNeeded
            }
        };

        self.log.append(&sample)?;

        // An unreadable log does not stop the report: it is charted as empty.
        let history = self.log.read_all().unwrap_or_else(|e| {
            tracing::warn!("history unavailable, charting without it: {e}");
            Vec::new()
        });

        let artifact = self.reports.build(&history, &sample, &self.os_name)?;

        let report = match &self.notifier {
            Some(notifier) => DeliveryStatus::from_result(notifier.deliver(
                artifact,
                &report_subject(sample.timestamp.date()),
                REPORT_BODY,
            )),
            None => {
                tracing::info!(path = %artifact.path().display(), "delivery disabled, report kept");
                DeliveryStatus::Disabled
            }
        };

        Ok(RunSummary {
            sample,
            alert_fired,
            alert,
            history_len: history.len(),
            report,
        })
    }
}
