use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{Local, SubsecRound};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use super::disk_collector::DiskCollector;
use crate::domain::entities::sample::Sample;
use crate::domain::ports::sampler::{MetricSampler, SamplingError};

/// Shortest CPU measurement window this sampler accepts.
pub const MIN_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Returns `(numerator / denominator) * 100.0`, or `0.0` when `denominator` is zero.
#[allow(clippy::cast_precision_loss)]
fn safe_percent(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        (numerator as f64 / denominator as f64) * 100.0
    } else {
        0.0
    }
}

/// Platform family name (`Linux`, `Darwin`, `Windows`, ...).
#[must_use]
pub fn platform_name() -> String {
    match std::env::consts::OS {
        "linux" => "Linux".to_string(),
        "macos" => "Darwin".to_string(),
        "windows" => "Windows".to_string(),
        "freebsd" => "FreeBSD".to_string(),
        "openbsd" => "OpenBSD".to_string(),
        "netbsd" => "NetBSD".to_string(),
        other => other.to_string(),
    }
}

/// Samples CPU and memory through the `sysinfo` crate and disk usage
/// through `statvfs` on the configured path.
///
/// Uses `Mutex<System>` for interior mutability since the `MetricSampler`
/// trait requires `&self` but `sysinfo::System` needs `&mut self` for refresh.
pub struct SysinfoSampler {
    sys: Mutex<System>,
    disk_collector: DiskCollector,
    window: Duration,
}

impl SysinfoSampler {
    /// Creates a sampler measuring CPU over `window` (raised to at least one
    /// second and to the provider's own minimum) and disk usage of the
    /// filesystem holding `disk_path`.
    #[must_use]
    pub fn new(window: Duration, disk_path: impl Into<PathBuf>) -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
                .with_memory(MemoryRefreshKind::everything()),
        );
        Self {
            sys: Mutex::new(sys),
            disk_collector: DiskCollector::new(disk_path),
            window: effective_window(window),
        }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new(MIN_SAMPLE_WINDOW, "/")
    }
}

fn effective_window(requested: Duration) -> Duration {
    requested
        .max(MIN_SAMPLE_WINDOW)
        .max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)
}

impl MetricSampler for SysinfoSampler {
    fn sample(&self) -> Result<Sample, SamplingError> {
        let mut sys = self.sys.lock().map_err(|e| {
            SamplingError::ProviderUnavailable(format!("system lock poisoned: {e}"))
        })?;

        sys.refresh_cpu_usage();
        std::thread::sleep(self.window);
        sys.refresh_cpu_usage();
        if sys.cpus().is_empty() {
            return Err(SamplingError::ProviderUnavailable(
                "no CPU reported by the system".to_string(),
            ));
        }
        let cpu_pct = f64::from(sys.global_cpu_usage());

        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return Err(SamplingError::ProviderUnavailable(
                "total memory reported as zero".to_string(),
            ));
        }
        let used = total.saturating_sub(sys.available_memory());
        let mem_pct = safe_percent(used, total);
        drop(sys);

        let disk_pct = self.disk_collector.usage_percent()?;
        let timestamp = Local::now().naive_local().trunc_subsecs(0);

        tracing::debug!(cpu = cpu_pct, mem = mem_pct, disk = disk_pct, "metrics collected");

        Ok(Sample::new(
            timestamp,
            cpu_pct,
            mem_pct,
            disk_pct,
            &platform_name(),
        ))
    }
}
