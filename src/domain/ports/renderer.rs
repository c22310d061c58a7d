use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::entities::sample::Sample;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("chart rendering failed: {0}")]
    Chart(String),
    #[error("document composition failed: {0}")]
    Document(String),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The three plotted metrics, in legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Cpu,
    Memory,
    Disk,
}

impl Series {
    pub const ALL: [Self; 3] = [Self::Cpu, Self::Memory, Self::Disk];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpu => "CPU Usage",
            Self::Memory => "Memory Usage",
            Self::Disk => "Disk Usage",
        }
    }

    #[must_use]
    pub const fn colour_name(self) -> &'static str {
        match self {
            Self::Cpu => "blue",
            Self::Memory => "orange",
            Self::Disk => "green",
        }
    }

    #[must_use]
    pub const fn value(self, sample: &Sample) -> f64 {
        match self {
            Self::Cpu => sample.cpu_pct,
            Self::Memory => sample.mem_pct,
            Self::Disk => sample.disk_pct,
        }
    }
}

/// Structured content handed to a [`DocumentComposer`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub subtitle: Option<String>,
    /// `(label, value)` pairs rendered as "label: value".
    pub summary: Vec<(String, String)>,
    pub chart_caption: String,
    pub chart_notes: Vec<String>,
    pub chart_image: PathBuf,
    /// Layout size of the embedded chart, in points.
    pub chart_width: f32,
    pub chart_height: f32,
}

pub trait ChartRenderer: Send + Sync {
    /// Render `history` as a three-series line chart image at `dest`.
    ///
    /// Must succeed for an empty history (axes and legend only).
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the image cannot be encoded or written.
    fn render(&self, history: &[Sample], dest: &Path) -> Result<(), RenderError>;
}

pub trait DocumentComposer: Send + Sync {
    /// Compose `document` into a paginated file at `dest`, replacing any
    /// existing file. Nothing is left at `dest` on failure.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the chart image cannot be read or the
    /// document cannot be written.
    fn compose(&self, document: &ReportDocument, dest: &Path) -> Result<(), RenderError>;
}
