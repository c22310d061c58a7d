use std::path::{Path, PathBuf};

/// MIME type of the composed report.
pub const REPORT_CONTENT_TYPE: &str = "application/pdf";

/// A transient file handed from the stage that built it to the next one.
///
/// Not `Clone`: an artifact has one owner at a time, and the notifier takes
/// it by value when it becomes responsible for deleting it.
#[derive(Debug, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    content_type: &'static str,
}

impl Artifact {
    /// The composed report at `path`.
    #[must_use]
    pub fn report(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content_type: REPORT_CONTENT_TYPE,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Base name used as the attachment filename.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "artifact".to_string(), |n| n.to_string_lossy().to_string())
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
