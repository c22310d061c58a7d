use anyhow::Context;
use colored::Colorize;

use crate::application::config::{AppConfig, MailCredentials};
use crate::application::services::notifier::{DeliveryOutcome, Notifier};
use crate::application::services::probe::{DeliveryStatus, ProbeService, RunSummary};
use crate::application::services::report::ReportBuilder;
use crate::domain::rules::CpuThresholdRule;
use crate::domain::value_objects::thresholds::AlertThreshold;
use crate::infrastructure::collectors::sysinfo_sampler::{platform_name, SysinfoSampler};
use crate::infrastructure::notifications::smtp::SmtpMailTransport;
use crate::infrastructure::persistence::csv_log::CsvHealthLog;
use crate::infrastructure::rendering::pdf_document::PdfComposer;
use crate::infrastructure::rendering::png_chart::PngChartRenderer;
use crate::presentation::cli::formatters::status_fmt::{format_usage_lines, print_section_header};

/// Runs the pipeline once and prints what happened.
///
/// Credentials are checked before anything is sampled unless `no_send` is
/// set. Returns the summary so the caller can pick the exit status.
///
/// # Errors
///
/// Returns an error if the threshold or credentials are invalid, the mail
/// transport cannot be set up, or a run-fatal stage fails.
pub fn run_probe(
    config: &AppConfig,
    threshold: Option<f64>,
    no_send: bool,
) -> anyhow::Result<RunSummary> {
    let threshold = match threshold {
        Some(pct) => AlertThreshold::new(pct).context("Invalid --threshold")?,
        None => config.probe.threshold(),
    };

    let transport = if no_send {
        tracing::info!("mail delivery disabled for this run");
        None
    } else {
        let credentials = MailCredentials::from_env().context("Mail credentials incomplete")?;
        Some(
            SmtpMailTransport::new(&config.smtp, &credentials)
                .context("Cannot set up mail transport")?,
        )
    };

    let sampler = SysinfoSampler::new(config.probe.sample_window(), config.probe.disk_path());
    let log = CsvHealthLog::new(config.paths.log_path());
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let reports = ReportBuilder::new(
        &chart,
        &composer,
        config.paths.chart_path(),
        config.paths.report_path(),
    );
    let notifier = transport.as_ref().map(|t| Notifier::new(t));

    let service = ProbeService::new(
        &sampler,
        &log,
        CpuThresholdRule::new(threshold),
        reports,
        notifier,
        platform_name(),
    );

    let summary = service.run_once()?;
    print_summary(&summary, threshold, &config.paths.report_path().display().to_string());
    Ok(summary)
}

fn print_summary(summary: &RunSummary, threshold: AlertThreshold, report_path: &str) {
    print_section_header(&format!("Sample {}", summary.sample.formatted_timestamp()));
    for line in format_usage_lines(&summary.sample, 30) {
        println!("{line}");
    }

    let alert = if summary.alert_fired {
        format!(
            "CPU above {:.1}%: {}",
            threshold.percent(),
            describe(&summary.alert)
        )
        .yellow()
        .to_string()
    } else {
        format!("CPU within {:.1}%", threshold.percent())
    };
    println!("  Alert:   {alert}");
    println!("  History: {} sample(s)", summary.history_len);
    println!("  Report:  {} ({report_path})", describe(&summary.report));
}

fn describe(status: &DeliveryStatus) -> String {
    match status {
        DeliveryStatus::Disabled => "not sent".to_string(),
        DeliveryStatus::NotNeeded => "none".to_string(),
        DeliveryStatus::Done(DeliveryOutcome::Sent) => "sent".green().to_string(),
        DeliveryStatus::Done(DeliveryOutcome::SkippedMissingArtifact) => {
            "skipped, file missing".yellow().to_string()
        }
        DeliveryStatus::Failed(e) => format!("delivery failed ({}): {e}", e.kind())
            .red()
            .to_string(),
    }
}
