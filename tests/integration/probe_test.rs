#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use healthprobe::application::services::notifier::{DeliveryOutcome, Notifier};
use healthprobe::application::services::probe::{DeliveryStatus, ProbeService, RunError};
use healthprobe::application::services::report::ReportBuilder;
use healthprobe::domain::entities::sample::Sample;
use healthprobe::domain::ports::mailer::{DeliveryError, MailTransport, OutgoingMail};
use healthprobe::domain::ports::sampler::{MetricSampler, SamplingError};
use healthprobe::domain::ports::store::HealthLog;
use healthprobe::domain::rules::CpuThresholdRule;
use healthprobe::domain::value_objects::thresholds::AlertThreshold;
use healthprobe::infrastructure::persistence::csv_log::CsvHealthLog;
use healthprobe::infrastructure::rendering::pdf_document::PdfComposer;
use healthprobe::infrastructure::rendering::png_chart::PngChartRenderer;
use healthprobe::presentation::cli::commands::Outcome;

// ---------------------------------------------------------------------------
// ScriptedSampler
// ---------------------------------------------------------------------------

/// Hands out queued samples in order, then reports the provider as gone.
struct ScriptedSampler {
    queue: Mutex<VecDeque<Sample>>,
}

impl ScriptedSampler {
    fn new(samples: Vec<Sample>) -> Self {
        Self {
            queue: Mutex::new(samples.into()),
        }
    }
}

impl MetricSampler for ScriptedSampler {
    fn sample(&self) -> Result<Sample, SamplingError> {
        self.queue
            .lock()
            .expect("lock")
            .pop_front()
            .ok_or_else(|| SamplingError::ProviderUnavailable("script exhausted".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().expect("lock").clone()
    }
}

impl MailTransport for RecordingTransport {
    fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        self.sent.lock().expect("lock").push(mail.clone());
        Ok(())
    }
}

/// Accepts plain messages, refuses anything with an attachment.
#[derive(Default)]
struct AttachmentRefusingTransport {
    accepted: Mutex<Vec<String>>,
}

impl MailTransport for AttachmentRefusingTransport {
    fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        if mail.attachment.is_some() {
            return Err(DeliveryError::TransportError(
                "connection reset by peer".to_string(),
            ));
        }
        self.accepted.lock().expect("lock").push(mail.subject.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 14)
        .and_then(|d| d.and_hms_opt(10, minute, 0))
        .expect("valid date")
}

fn sample(minute: u32, cpu: f64) -> Sample {
    Sample::new(at(minute), cpu, 50.0, 30.0, "Linux")
}

fn default_rule() -> CpuThresholdRule {
    CpuThresholdRule::new(AlertThreshold::default())
}

struct Paths {
    log: std::path::PathBuf,
    chart: std::path::PathBuf,
    report: std::path::PathBuf,
}

fn paths_in(dir: &Path) -> Paths {
    Paths {
        log: dir.join("system_health_log.csv"),
        chart: dir.join("system_health_graph.png"),
        report: dir.join("system_health_report.pdf"),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn high_cpu_alert_is_sent_before_the_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = paths_in(dir.path());
    let sampler = ScriptedSampler::new(vec![sample(0, 95.0)]);
    let log = CsvHealthLog::new(&paths.log);
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let transport = RecordingTransport::default();

    let service = ProbeService::new(
        &sampler,
        &log,
        default_rule(),
        ReportBuilder::new(&chart, &composer, &paths.chart, &paths.report),
        Some(Notifier::new(&transport)),
        "Linux",
    );
    let summary = service.run_once().expect("run succeeds");

    assert!(summary.alert_fired);
    assert!(!summary.delivery_failed());
    assert_eq!(Outcome::from_summary(&summary).exit_status(), 0);
    assert!(matches!(
        summary.report,
        DeliveryStatus::Done(DeliveryOutcome::Sent)
    ));

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].subject, "System Health Alert: CPU usage at 95.0%");
    assert!(sent[0].attachment.is_none());
    assert_eq!(sent[1].subject, "Automated System Health Report - 2024-07-14");
    let attachment = sent[1].attachment.as_ref().expect("report attached");
    assert_eq!(attachment.filename, "system_health_report.pdf");
    assert!(attachment.bytes.starts_with(b"%PDF-"));

    // Delivered report is consumed; the chart stays for the next run.
    assert!(!paths.report.exists());
    assert!(paths.chart.exists());
    assert_eq!(log.read_all().expect("read").len(), 1);
}

#[test]
fn cpu_at_threshold_sends_only_the_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = paths_in(dir.path());
    let sampler = ScriptedSampler::new(vec![sample(0, 80.0)]);
    let log = CsvHealthLog::new(&paths.log);
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let transport = RecordingTransport::default();

    let service = ProbeService::new(
        &sampler,
        &log,
        default_rule(),
        ReportBuilder::new(&chart, &composer, &paths.chart, &paths.report),
        Some(Notifier::new(&transport)),
        "Linux",
    );
    let summary = service.run_once().expect("run succeeds");

    assert!(!summary.alert_fired);
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.starts_with("Automated System Health Report"));
}

#[test]
fn report_transport_failure_keeps_artifact_and_log_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = paths_in(dir.path());
    let sampler = ScriptedSampler::new(vec![sample(5, 95.0)]);
    let log = CsvHealthLog::new(&paths.log);
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let transport = AttachmentRefusingTransport::default();

    let service = ProbeService::new(
        &sampler,
        &log,
        default_rule(),
        ReportBuilder::new(&chart, &composer, &paths.chart, &paths.report),
        Some(Notifier::new(&transport)),
        "Linux",
    );
    let summary = service.run_once().expect("delivery failure is not fatal");

    assert!(summary.delivery_failed());
    let outcome = Outcome::from_summary(&summary);
    assert_eq!(outcome, Outcome::DeliveryFailed);
    assert_ne!(outcome.exit_status(), 0);
    assert!(matches!(
        summary.alert,
        DeliveryStatus::Done(DeliveryOutcome::Sent)
    ));
    match &summary.report {
        DeliveryStatus::Failed(e) => assert_eq!(e.kind(), "transport"),
        other => panic!("expected a failed report delivery, got {other:?}"),
    }

    assert!(paths.report.exists());
    let history = log.read_all().expect("read");
    assert_eq!(history, vec![sample(5, 95.0)]);
}

#[test]
fn absent_log_is_created_and_report_is_built() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = paths_in(&dir.path().join("fresh"));
    assert!(!paths.log.exists());

    let sampler = ScriptedSampler::new(vec![sample(0, 10.0)]);
    let log = CsvHealthLog::new(&paths.log);
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();

    let service = ProbeService::new(
        &sampler,
        &log,
        default_rule(),
        ReportBuilder::new(&chart, &composer, &paths.chart, &paths.report),
        None,
        "Linux",
    );
    let summary = service.run_once().expect("run succeeds");

    assert_eq!(summary.history_len, 1);
    assert!(matches!(summary.report, DeliveryStatus::Disabled));
    assert!(paths.log.exists());
    assert!(paths.report.exists());
}

#[test]
fn two_runs_append_two_rows_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = paths_in(dir.path());
    let sampler = ScriptedSampler::new(vec![sample(1, 20.0), sample(2, 30.0)]);
    let log = CsvHealthLog::new(&paths.log);
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();

    let service = ProbeService::new(
        &sampler,
        &log,
        default_rule(),
        ReportBuilder::new(&chart, &composer, &paths.chart, &paths.report),
        None,
        "Linux",
    );
    let first = service.run_once().expect("first run");
    let second = service.run_once().expect("second run");

    assert_eq!(first.history_len, 1);
    assert_eq!(second.history_len, 2);
    let history = log.read_all().expect("read");
    assert_eq!(history, vec![sample(1, 20.0), sample(2, 30.0)]);

    let reports = std::fs::read_dir(dir.path())
        .expect("list")
        .filter_map(Result::ok)
        .filter(|e| e.file_name() == "system_health_report.pdf")
        .count();
    assert_eq!(reports, 1);
}

#[test]
fn sampling_failure_stops_before_any_side_effect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = paths_in(dir.path());
    let sampler = ScriptedSampler::new(vec![]);
    let log = CsvHealthLog::new(&paths.log);
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let transport = RecordingTransport::default();

    let service = ProbeService::new(
        &sampler,
        &log,
        default_rule(),
        ReportBuilder::new(&chart, &composer, &paths.chart, &paths.report),
        Some(Notifier::new(&transport)),
        "Linux",
    );
    let err = service.run_once().expect_err("no sample available");

    assert!(matches!(err, RunError::Sampling(_)));
    assert!(!paths.log.exists());
    assert!(!paths.chart.exists());
    assert!(transport.sent().is_empty());
}

#[test]
fn log_write_failure_is_fatal_but_alert_already_went_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"").expect("seed blocker file");
    let paths = paths_in(dir.path());

    let sampler = ScriptedSampler::new(vec![sample(0, 99.0)]);
    let log = CsvHealthLog::new(blocker.join("system_health_log.csv"));
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let transport = RecordingTransport::default();

    let service = ProbeService::new(
        &sampler,
        &log,
        default_rule(),
        ReportBuilder::new(&chart, &composer, &paths.chart, &paths.report),
        Some(Notifier::new(&transport)),
        "Linux",
    );
    let err = service.run_once().expect_err("log cannot be written");

    assert!(matches!(err, RunError::LogWrite(_)));
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.starts_with("System Health Alert"));
    assert!(!paths.report.exists());
}

#[test]
fn render_failure_is_fatal_and_leaves_no_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"").expect("seed blocker file");
    let paths = paths_in(dir.path());

    let sampler = ScriptedSampler::new(vec![sample(0, 10.0)]);
    let log = CsvHealthLog::new(&paths.log);
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let transport = RecordingTransport::default();

    let service = ProbeService::new(
        &sampler,
        &log,
        default_rule(),
        ReportBuilder::new(
            &chart,
            &composer,
            blocker.join("system_health_graph.png"),
            &paths.report,
        ),
        Some(Notifier::new(&transport)),
        "Linux",
    );
    let err = service.run_once().expect_err("chart cannot be written");

    assert!(matches!(err, RunError::Render(_)));
    assert_eq!(log.read_all().expect("read").len(), 1);
    assert!(!paths.report.exists());
    assert!(transport.sent().is_empty());
}
