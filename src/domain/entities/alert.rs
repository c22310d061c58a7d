use std::fmt::Write;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::sample::{Sample, TIMESTAMP_FORMAT};

/// Lightweight alert payload raised when CPU usage crosses the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuAlert {
    pub timestamp: NaiveDateTime,
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub disk_pct: f64,
    pub threshold: f64,
    pub os_name: String,
}

impl CpuAlert {
    #[must_use]
    pub fn from_sample(sample: &Sample, threshold: f64) -> Self {
        Self {
            timestamp: sample.timestamp,
            cpu_pct: sample.cpu_pct,
            mem_pct: sample.mem_pct,
            disk_pct: sample.disk_pct,
            threshold,
            os_name: sample.os_name.clone(),
        }
    }

    #[must_use]
    pub fn subject(&self) -> String {
        format!("System Health Alert: CPU usage at {:.1}%", self.cpu_pct)
    }

    #[must_use]
    pub fn body(&self) -> String {
        let mut body = format!(
            "CPU usage exceeded the alert threshold of {:.1}%.\n\n",
            self.threshold
        );
        let _ = writeln!(body, "Time: {}", self.timestamp.format(TIMESTAMP_FORMAT));
        let _ = writeln!(body, "Operating System: {}", self.os_name);
        let _ = writeln!(body, "CPU Usage: {:.1}%", self.cpu_pct);
        let _ = writeln!(body, "Memory Usage: {:.1}%", self.mem_pct);
        let _ = writeln!(body, "Disk Usage: {:.1}%", self.disk_pct);
        body
    }
}
