use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{ImageReader, RgbImage};

use super::write_atomically;
use crate::domain::ports::renderer::{DocumentComposer, RenderError, ReportDocument};

/// US Letter, in points.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;

const TITLE_SIZE: f32 = 22.0;
const BODY_SIZE: f32 = 12.0;
const NOTE_SIZE: f32 = 9.0;
const LEADING: f32 = 18.0;
const SPACER: f32 = 20.0;

/// Composes a one-page PDF: title, summary, and the chart as an embedded
/// RGB image. Text uses the built-in Helvetica faces, so nothing is embedded
/// besides the chart.
pub struct PdfComposer;

impl PdfComposer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the PDF bytes for `document` with `chart` already decoded.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Document` if the chart pixels cannot be compressed.
    pub fn build(&self, document: &ReportDocument, chart: &RgbImage) -> Result<Vec<u8>, RenderError> {
        let content = page_content(document);
        let image_stream = deflate(chart.as_raw())?;

        let mut pdf = PdfWriter::new();
        pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
        pdf.object("<< /Type /Pages /Kids [3 0 R] /Count 1 >>");
        pdf.object(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 5 0 R /F2 6 0 R >> /XObject << /Im1 7 0 R >> >> \
             /Contents 4 0 R >>"
        ));
        pdf.stream("<<", content.as_bytes());
        pdf.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
        pdf.object(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        );
        pdf.stream(
            &format!(
                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                 /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode",
                chart.width(),
                chart.height()
            ),
            &image_stream,
        );
        pdf.object(&format!(
            "<< /Title ({}) /Producer (healthprobe) >>",
            escape_text(&document.title)
        ));
        Ok(pdf.finish(1, 8))
    }
}

impl Default for PdfComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentComposer for PdfComposer {
    fn compose(&self, document: &ReportDocument, dest: &Path) -> Result<(), RenderError> {
        let chart = load_chart(&document.chart_image)?;
        let bytes = self.build(document, &chart)?;
        write_atomically(dest, &bytes)?;
        tracing::debug!(path = %dest.display(), bytes = bytes.len(), "report composed");
        Ok(())
    }
}

fn load_chart(path: &Path) -> Result<RgbImage, RenderError> {
    let io_err = |source: std::io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let decoded = ImageReader::open(path)
        .map_err(io_err)?
        .with_guessed_format()
        .map_err(io_err)?
        .decode()
        .map_err(|e| {
            RenderError::Document(format!("cannot decode chart {}: {e}", path.display()))
        })?;
    Ok(decoded.to_rgb8())
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>, RenderError> {
    let compress_err = |e: std::io::Error| RenderError::Document(format!("image compression failed: {e}"));
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw).map_err(compress_err)?;
    encoder.finish().map_err(compress_err)
}

/// Page content stream: text runs top-down, then the chart.
fn page_content(document: &ReportDocument) -> String {
    let mut ops = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    centred_text(&mut ops, "F2", TITLE_SIZE, y, &document.title);
    y -= TITLE_SIZE + 6.0;
    if let Some(subtitle) = &document.subtitle {
        centred_text(&mut ops, "F1", NOTE_SIZE + 1.0, y, subtitle);
        y -= LEADING;
    }
    y -= SPACER;

    for (label, value) in &document.summary {
        let _ = writeln!(
            ops,
            "BT /F2 {BODY_SIZE} Tf {MARGIN} {y:.2} Td ({}:) Tj /F1 {BODY_SIZE} Tf ( {}) Tj ET",
            escape_text(label),
            escape_text(value)
        );
        y -= LEADING;
    }
    y -= SPACER;

    centred_text(&mut ops, "F2", BODY_SIZE, y, &document.chart_caption);
    y -= 8.0;

    let (w, h) = (document.chart_width, document.chart_height);
    let x = (PAGE_WIDTH - w) / 2.0;
    y -= h;
    let _ = writeln!(ops, "q {w:.2} 0 0 {h:.2} {x:.2} {y:.2} cm /Im1 Do Q");
    y -= LEADING;

    for note in &document.chart_notes {
        centred_text(&mut ops, "F1", NOTE_SIZE, y, note);
        y -= NOTE_SIZE + 4.0;
    }

    ops
}

fn centred_text(ops: &mut String, font: &str, size: f32, y: f32, text: &str) {
    let x = ((PAGE_WIDTH - estimated_width(text, size)) / 2.0).max(MARGIN / 2.0);
    let _ = writeln!(
        ops,
        "BT /{font} {size} Tf {x:.2} {y:.2} Td ({}) Tj ET",
        escape_text(text)
    );
}

/// Rough Helvetica advance width; good enough to centre a line.
#[allow(clippy::cast_precision_loss)]
fn estimated_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.52
}

/// Escapes a string for a PDF literal; characters outside printable ASCII
/// become `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Sequential object writer tracking byte offsets for the xref table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn begin(&mut self) -> usize {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        id
    }

    fn object(&mut self, body: &str) {
        self.begin();
        self.buf.extend_from_slice(body.as_bytes());
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    /// `dict_open` is the stream dictionary without its closing `>>`; the
    /// length entry is appended here.
    fn stream(&mut self, dict_open: &str, data: &[u8]) {
        self.begin();
        self.buf.extend_from_slice(
            format!("{dict_open} /Length {} >>\nstream\n", data.len()).as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: usize, info: usize) -> Vec<u8> {
        let xref_at = self.buf.len();
        let count = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {count}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {count} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}
