pub mod pdf_document;
pub mod png_chart;

use std::io::Write;
use std::path::Path;

use crate::domain::ports::renderer::RenderError;

/// Writes `bytes` to a temporary sibling of `dest`, then renames it over
/// `dest`. A failure leaves `dest` untouched and removes the temporary file.
pub(crate) fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let io_err = |source: std::io::Error| RenderError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(dest).map_err(|e| io_err(e.error))?;
    Ok(())
}
