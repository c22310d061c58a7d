use anyhow::Context;
use colored::Colorize;

use crate::application::config::AppConfig;
use crate::domain::ports::sampler::MetricSampler;
use crate::infrastructure::collectors::sysinfo_sampler::SysinfoSampler;
use crate::presentation::cli::formatters::status_fmt::{format_usage_lines, print_section_header};

/// Takes one sample and prints it. Nothing is logged or sent.
///
/// # Errors
///
/// Returns an error if system metrics collection or JSON serialization fails.
pub fn run_status(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let sampler = SysinfoSampler::new(config.probe.sample_window(), config.probe.disk_path());
    let sample = sampler
        .sample()
        .context("Failed to sample system metrics")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sample)?);
        return Ok(());
    }

    println!("{}", "healthprobe: System Status".bold().cyan());
    println!("{}", "━".repeat(50));

    print_section_header(&format!("\n{} at {}", sample.os_name, sample.formatted_timestamp()));
    for line in format_usage_lines(&sample, 30) {
        println!("{line}");
    }
    println!("  Disk measured at {}", config.probe.disk_path().display());

    Ok(())
}
