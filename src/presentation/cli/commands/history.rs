use anyhow::Context;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::entities::sample::Sample;
use crate::domain::ports::store::HealthLog;
use crate::presentation::cli::formatters::status_fmt::{
    colorize_percent, format_sample_table, print_section_header,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    pub average: f64,
    pub peak: f64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct HistorySummary {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<MetricStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MetricStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<MetricStats>,
    pub recent: Vec<Sample>,
}

/// Reads the log back and prints count, time range, per-metric averages and
/// peaks, and the `limit` most recent rows.
///
/// # Errors
///
/// Returns an error if the log exists but cannot be read, or JSON
/// serialization fails.
pub fn run_history(log: &dyn HealthLog, limit: usize, json: bool) -> anyhow::Result<()> {
    let samples = log.read_all().context("Failed to read health log")?;
    let summary = summarize(&samples, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_section_header("Recorded history");
    let (Some(first), Some(last)) = (summary.first, summary.last) else {
        println!("  No samples recorded yet.");
        return Ok(());
    };
    println!("  {} sample(s) from {first} to {last}", summary.count);

    for (label, stats) in [
        ("CPU", summary.cpu),
        ("Memory", summary.memory),
        ("Disk", summary.disk),
    ] {
        if let Some(stats) = stats {
            println!(
                "  {label:<7} avg {}  peak {}",
                colorize_percent(stats.average),
                colorize_percent(stats.peak)
            );
        }
    }

    print_section_header(&format!("\nLatest {} row(s)", summary.recent.len()));
    println!("{}", format_sample_table(&summary.recent));
    Ok(())
}

/// Aggregates `samples`, which must already be in ascending time order.
#[must_use]
pub fn summarize(samples: &[Sample], limit: usize) -> HistorySummary {
    let skip = samples.len().saturating_sub(limit);
    HistorySummary {
        count: samples.len(),
        first: samples.first().map(|s| s.timestamp),
        last: samples.last().map(|s| s.timestamp),
        cpu: stats(samples, |s| s.cpu_pct),
        memory: stats(samples, |s| s.mem_pct),
        disk: stats(samples, |s| s.disk_pct),
        recent: samples[skip..].to_vec(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn stats(samples: &[Sample], metric: impl Fn(&Sample) -> f64) -> Option<MetricStats> {
    let peak = samples.iter().map(&metric).reduce(f64::max)?;
    let total: f64 = samples.iter().map(&metric).sum();
    Some(MetricStats {
        average: total / samples.len() as f64,
        peak,
    })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::in_memory_log::InMemoryHealthLog;
    use chrono::NaiveDate;

    fn make_sample(h: u32, cpu: f64, mem: f64, disk: f64) -> Sample {
        let ts = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(h, 0, 0))
            .expect("valid date");
        Sample::new(ts, cpu, mem, disk, "Linux")
    }

    #[test]
    fn summarize_empty_history() {
        let summary = summarize(&[], 5);
        assert_eq!(summary.count, 0);
        assert!(summary.first.is_none());
        assert!(summary.cpu.is_none());
        assert!(summary.recent.is_empty());
    }

    #[test]
    fn summarize_computes_average_and_peak() {
        let samples = vec![
            make_sample(1, 10.0, 40.0, 70.0),
            make_sample(2, 30.0, 60.0, 70.0),
            make_sample(3, 20.0, 50.0, 70.0),
        ];
        let summary = summarize(&samples, 2);

        assert_eq!(summary.count, 3);
        assert_eq!(summary.first, Some(samples[0].timestamp));
        assert_eq!(summary.last, Some(samples[2].timestamp));
        let cpu = summary.cpu.expect("cpu stats");
        assert!((cpu.average - 20.0).abs() < 1e-9);
        assert!((cpu.peak - 30.0).abs() < f64::EPSILON);
        assert_eq!(summary.recent, samples[1..].to_vec());
    }

    #[test]
    fn limit_larger_than_history_keeps_everything() {
        let samples = vec![make_sample(1, 1.0, 1.0, 1.0)];
        assert_eq!(summarize(&samples, 50).recent.len(), 1);
    }

    #[test]
    fn json_output_carries_counts_and_rows() {
        let summary = summarize(&[make_sample(4, 1.0, 2.0, 3.0)], 1);
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["count"], 1);
        assert_eq!(json["recent"][0]["cpu_pct"], 1.0);
        assert!(json["first"].as_str().expect("string").starts_with("2024-06-01"));
    }

    #[test]
    fn run_history_on_empty_log_succeeds() {
        let log = InMemoryHealthLog::new();
        run_history(&log, 10, false).expect("empty history prints");
        run_history(&log, 10, true).expect("empty history as json");
    }
}
