use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::domain::entities::sample::{Sample, TIMESTAMP_FORMAT};
use crate::domain::ports::store::{HealthLog, StoreError};

/// Health log stored as comma-separated rows without a header:
/// `timestamp,cpu_pct,mem_pct,disk_pct,os_name`.
pub struct CsvHealthLog {
    path: PathBuf,
}

impl CsvHealthLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Formats one log row, without the trailing newline.
#[must_use]
pub fn format_row(sample: &Sample) -> String {
    format!(
        "{},{:.1},{:.1},{:.1},{}",
        sample.timestamp.format(TIMESTAMP_FORMAT),
        sample.cpu_pct,
        sample.mem_pct,
        sample.disk_pct,
        sample.os_name
    )
}

/// Parses one log row. Returns `None` for rows that cannot be charted:
/// missing fields, a timestamp not in `YYYY-MM-DD HH:MM:SS`, or a
/// non-numeric percentage.
#[must_use]
pub fn parse_row(line: &str) -> Option<Sample> {
    let mut fields = line.splitn(5, ',').map(str::trim);
    let timestamp = NaiveDateTime::parse_from_str(fields.next()?, TIMESTAMP_FORMAT).ok()?;
    let cpu = parse_percent(fields.next()?)?;
    let mem = parse_percent(fields.next()?)?;
    let disk = parse_percent(fields.next()?)?;
    let os_name = fields.next()?;
    Some(Sample::new(timestamp, cpu, mem, disk, os_name))
}

fn parse_percent(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl HealthLog for CsvHealthLog {
    fn append(&self, sample: &Sample) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::LogWriteError(format!(
                    "cannot create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                StoreError::LogWriteError(format!("cannot open {}: {e}", self.path.display()))
            })?;

        writeln!(file, "{}", format_row(sample))
            .and_then(|()| file.flush())
            .map_err(|e| {
                StoreError::LogWriteError(format!("cannot write {}: {e}", self.path.display()))
            })
    }

    fn read_all(&self) -> Result<Vec<Sample>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::LogReadError(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };
        let content = String::from_utf8_lossy(&bytes);

        let mut samples = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(line) {
                Some(sample) => samples.push(sample),
                None => tracing::debug!(line = index + 1, "dropping unparseable log row"),
            }
        }

        // Stable: rows sharing a timestamp keep file order.
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }
}
