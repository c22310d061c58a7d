use std::path::{Path, PathBuf};

use crate::domain::ports::sampler::SamplingError;

/// Reports usage of the filesystem that holds a target path, as `df` does.
///
/// Blocks reserved for the superuser count as neither used nor available,
/// so the figure is `used / (used + available)` rather than `used / total`.
pub struct DiskCollector {
    target: PathBuf,
}

/// Raw block counts of one filesystem, all in fragment-size units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCounts {
    pub total: u64,
    pub free: u64,
    pub available: u64,
}

impl BlockCounts {
    /// Used share of the space visible to unprivileged users, in percent.
    ///
    /// An empty filesystem (no used and no available blocks) reads as 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn usage_percent(self) -> f64 {
        let used = self.total.saturating_sub(self.free);
        let visible = used.saturating_add(self.available);
        if visible == 0 {
            return 0.0;
        }
        ((used as f64 / visible as f64) * 100.0).clamp(0.0, 100.0)
    }
}

impl DiskCollector {
    #[must_use]
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Used space of the owning filesystem, in percent.
    ///
    /// # Errors
    ///
    /// Returns `SamplingError::ProviderUnavailable` if the filesystem holding
    /// the target cannot be queried.
    pub fn usage_percent(&self) -> Result<f64, SamplingError> {
        Ok(self.block_counts()?.usage_percent())
    }

    #[cfg(unix)]
    #[allow(clippy::useless_conversion)]
    fn block_counts(&self) -> Result<BlockCounts, SamplingError> {
        let stat = nix::sys::statvfs::statvfs(self.target.as_path()).map_err(|e| {
            SamplingError::ProviderUnavailable(format!(
                "statvfs({}) failed: {e}",
                self.target.display()
            ))
        })?;

        // Counts are in fragment-size units; the ratio needs no scaling.
        Ok(BlockCounts {
            total: u64::from(stat.blocks()),
            free: u64::from(stat.blocks_free()),
            available: u64::from(stat.blocks_available()),
        })
    }

    #[cfg(not(unix))]
    fn block_counts(&self) -> Result<BlockCounts, SamplingError> {
        Err(SamplingError::ProviderUnavailable(format!(
            "disk usage of {} is only available on unix hosts",
            self.target.display()
        )))
    }
}
