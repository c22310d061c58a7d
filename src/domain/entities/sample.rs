use chrono::NaiveDateTime;
use serde::Serialize;

/// Timestamp layout used in the health log and in every rendered artifact.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One timestamped reading of CPU, memory and disk utilization.
///
/// Percentages are in `[0, 100]`; the timestamp carries second precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub disk_pct: f64,
    pub os_name: String,
}

impl Sample {
    /// Builds a sample, clamping percentages into `[0, 100]` and stripping
    /// separator characters from the OS name.
    #[must_use]
    pub fn new(
        timestamp: NaiveDateTime,
        cpu_pct: f64,
        mem_pct: f64,
        disk_pct: f64,
        os_name: &str,
    ) -> Self {
        Self {
            timestamp,
            cpu_pct: clamp_percent(cpu_pct),
            mem_pct: clamp_percent(mem_pct),
            disk_pct: clamp_percent(disk_pct),
            os_name: sanitize_field(os_name),
        }
    }

    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Replaces characters that would break a log row (field separator, line breaks).
fn sanitize_field(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c == ',' || c.is_control() { ' ' } else { c })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}
