use std::io::Cursor;
use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{ImageFormat, Rgb, RgbImage};

use super::write_atomically;
use crate::domain::entities::sample::Sample;
use crate::domain::ports::renderer::{ChartRenderer, RenderError, Series};

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 400;

pub const CHART_TITLE: &str = "System Health Over Time";
pub const TIME_AXIS_TITLE: &str = "Time";
pub const VALUE_AXIS_TITLE: &str = "Usage (%)";

const MARGIN_LEFT: u32 = 72;
const MARGIN_RIGHT: u32 = 24;
const MARGIN_TOP: u32 = 60;
const MARGIN_BOTTOM: u32 = 104;

/// Glyph cell size of the bitmap font, in pixels at scale 1.
const GLYPH: i64 = 8;

/// Samples beyond this count are drawn without point markers.
const MARKER_LIMIT: usize = 120;

/// Spans shorter than this get second-resolution tick labels.
const SHORT_SPAN_SECS: i64 = 600;

const SWATCH_W: i64 = 24;
const SWATCH_H: i64 = 6;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const TEXT: Rgb<u8> = Rgb([20, 20, 20]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);

const fn series_colour(series: Series) -> Rgb<u8> {
    match series {
        Series::Cpu => Rgb([31, 119, 180]),
        Series::Memory => Rgb([255, 127, 14]),
        Series::Disk => Rgb([44, 160, 44]),
    }
}

/// Pixel rectangle holding the plotted lines.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
}

impl PlotArea {
    fn new(width: u32, height: u32) -> Self {
        Self {
            left: i64::from(MARGIN_LEFT),
            right: i64::from(width.saturating_sub(MARGIN_RIGHT)),
            top: i64::from(MARGIN_TOP),
            bottom: i64::from(height.saturating_sub(MARGIN_BOTTOM)),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn y_for(&self, percent: f64) -> i64 {
        let ratio = (percent / 100.0).clamp(0.0, 1.0);
        self.bottom - (ratio * (self.bottom - self.top) as f64).round() as i64
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn x_for(&self, ratio: f64) -> i64 {
        self.left + (ratio.clamp(0.0, 1.0) * (self.right - self.left) as f64).round() as i64
    }
}

/// A labelled position on the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTick {
    /// Horizontal position as a ratio of the plotted time span.
    pub ratio: f64,
    pub label: String,
}

/// Renders the sample history as an 800x400 PNG line chart.
///
/// The image is self-describing: it carries the chart title, both axis
/// titles, percentage and time tick labels, and a legend naming each series
/// next to its colour swatch.
pub struct PngChartRenderer {
    width: u32,
    height: u32,
}

impl PngChartRenderer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
        }
    }

    /// Draws the chart into an in-memory image.
    #[must_use]
    pub fn draw(&self, history: &[Sample]) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, WHITE);
        let area = PlotArea::new(self.width, self.height);

        draw_grid(&mut img, area);
        draw_titles(&mut img, area);
        draw_legend(&mut img, area);
        draw_time_labels(&mut img, area, &time_ticks(history));

        let xs = time_positions(history);
        for series in Series::ALL {
            let colour = series_colour(series);
            let points: Vec<(i64, i64)> = history
                .iter()
                .zip(&xs)
                .map(|(sample, ratio)| (area.x_for(*ratio), area.y_for(series.value(sample))))
                .collect();

            for pair in points.windows(2) {
                draw_thick_line(&mut img, pair[0], pair[1], colour);
            }
            if points.len() <= MARKER_LIMIT {
                for &(x, y) in &points {
                    fill_rect(&mut img, x - 2, y - 2, 5, 5, colour);
                }
            }
        }

        img
    }
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, history: &[Sample], dest: &Path) -> Result<(), RenderError> {
        let img = self.draw(history);

        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| RenderError::Chart(format!("PNG encoding failed: {e}")))?;

        write_atomically(dest, &cursor.into_inner())?;
        tracing::debug!(path = %dest.display(), samples = history.len(), "chart rendered");
        Ok(())
    }
}

fn time_bounds(history: &[Sample]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = history.iter().map(|s| s.timestamp).min()?;
    let last = history.iter().map(|s| s.timestamp).max()?;
    Some((first, last))
}

/// Horizontal position of each sample as a ratio of the time span.
///
/// A single sample, or a history whose samples share one timestamp, is
/// centred.
#[allow(clippy::cast_precision_loss)]
fn time_positions(history: &[Sample]) -> Vec<f64> {
    let Some((first, last)) = time_bounds(history) else {
        return Vec::new();
    };

    let span = (last - first).num_seconds();
    if span <= 0 {
        return vec![0.5; history.len()];
    }
    history
        .iter()
        .map(|s| (s.timestamp - first).num_seconds() as f64 / span as f64)
        .collect()
}

/// Labelled time-axis positions for `history`.
///
/// Five evenly spaced ticks from the first to the last timestamp, or one
/// centred tick when the history covers a single instant. No ticks for an
/// empty history.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn time_ticks(history: &[Sample]) -> Vec<TimeTick> {
    let Some((first, last)) = time_bounds(history) else {
        return Vec::new();
    };

    let span = (last - first).num_seconds();
    let format = if span < SHORT_SPAN_SECS {
        "%H:%M:%S"
    } else {
        "%m-%d %H:%M"
    };

    if span <= 0 {
        return vec![TimeTick {
            ratio: 0.5,
            label: first.format(format).to_string(),
        }];
    }

    (0..=4)
        .map(|step| {
            let ratio = f64::from(step) / 4.0;
            let offset = Duration::seconds((span as f64 * ratio).round() as i64);
            TimeTick {
                ratio,
                label: (first + offset).format(format).to_string(),
            }
        })
        .collect()
}

fn draw_grid(img: &mut RgbImage, area: PlotArea) {
    for pct in [25.0, 50.0, 75.0, 100.0] {
        let y = area.y_for(pct);
        draw_line(img, (area.left, y), (area.right, y), GRID);
    }
    for step in 1..=4 {
        let x = area.x_for(f64::from(step) / 4.0);
        draw_line(img, (x, area.top), (x, area.bottom), GRID);
    }

    // Axes, with labelled tick marks every 25 % on the value axis.
    draw_line(img, (area.left, area.top), (area.left, area.bottom), AXIS);
    draw_line(img, (area.left, area.bottom), (area.right, area.bottom), AXIS);
    for pct in [0u8, 25, 50, 75, 100] {
        let y = area.y_for(f64::from(pct));
        draw_line(img, (area.left - 6, y), (area.left, y), AXIS);
        let label = pct.to_string();
        let x = area.left - 10 - text_width(&label, 1);
        draw_text(img, &label, (x, y - GLYPH / 2), 1, 0.0, TEXT);
    }
    for step in 0..=4 {
        let x = area.x_for(f64::from(step) / 4.0);
        draw_line(img, (x, area.bottom), (x, area.bottom + 6), AXIS);
    }
}

fn draw_titles(img: &mut RgbImage, area: PlotArea) {
    let centre_x = (area.left + area.right) / 2;
    let title_x = centre_x - text_width(CHART_TITLE, 2) / 2;
    draw_text(img, CHART_TITLE, (title_x, 8), 2, 0.0, TEXT);

    let time_x = centre_x - text_width(TIME_AXIS_TITLE, 1) / 2;
    let time_y = i64::from(img.height()) - GLYPH - 6;
    draw_text(img, TIME_AXIS_TITLE, (time_x, time_y), 1, 0.0, TEXT);

    // Reads bottom to top, centred on the value axis.
    let centre_y = (area.top + area.bottom) / 2;
    let value_y = centre_y + text_width(VALUE_AXIS_TITLE, 1) / 2;
    draw_text(img, VALUE_AXIS_TITLE, (6, value_y), 1, -90.0, TEXT);
}

fn draw_legend(img: &mut RgbImage, area: PlotArea) {
    let mut x = area.left;
    let y = area.top - 22;
    for series in Series::ALL {
        fill_rect(img, x, y + 1, SWATCH_W, SWATCH_H, series_colour(series));
        x += SWATCH_W + 6;
        draw_text(img, series.label(), (x, y), 1, 0.0, TEXT);
        x += text_width(series.label(), 1) + 24;
    }
}

/// Tick labels slanted 45 degrees upwards, each ending at its tick mark.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn draw_time_labels(img: &mut RgbImage, area: PlotArea, ticks: &[TimeTick]) {
    let diagonal = std::f64::consts::FRAC_1_SQRT_2;
    for tick in ticks {
        let end_x = area.x_for(tick.ratio);
        let end_y = area.bottom + 10;
        let run = (text_width(&tick.label, 1) as f64 * diagonal).round() as i64;
        draw_text(img, &tick.label, (end_x - run, end_y + run), 1, -45.0, TEXT);
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn text_width(text: &str, scale: i64) -> i64 {
    // Labels are ASCII, so bytes count glyphs.
    text.len() as i64 * GLYPH * scale
}

/// Draws `text` with its top-left corner at `origin`, rotated by `degrees`
/// (clockwise in image space) about that corner.
///
/// Every destination pixel in the rotated bounding box is mapped back into
/// glyph space, so rotated text has no gaps. Characters missing from the
/// font are left blank.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn draw_text(
    img: &mut RgbImage,
    text: &str,
    origin: (i64, i64),
    scale: i64,
    degrees: f64,
    colour: Rgb<u8>,
) {
    let glyphs: Vec<Option<[u8; 8]>> = text.chars().map(|c| BASIC_FONTS.get(c)).collect();
    if glyphs.is_empty() || scale <= 0 {
        return;
    }

    let cell = (GLYPH * scale) as f64;
    let width = cell * glyphs.len() as f64;
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (ox, oy) = (origin.0 as f64, origin.1 as f64);

    let corners = [(0.0, 0.0), (width, 0.0), (0.0, cell), (width, cell)]
        .map(|(u, v)| (ox + u * cos - v * sin, oy + u * sin + v * cos));
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor() as i64;
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor() as i64;
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max).ceil() as i64;

    for py in min_y..=max_y {
        for px in min_x..=max_x {
            let dx = px as f64 + 0.5 - ox;
            let dy = py as f64 + 0.5 - oy;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            if u < 0.0 || v < 0.0 || u >= width || v >= cell {
                continue;
            }

            let index = (u / cell) as usize;
            let column = ((u % cell) / scale as f64) as u32;
            let row = (v / scale as f64) as usize;
            let lit = glyphs
                .get(index)
                .copied()
                .flatten()
                .and_then(|bitmap| bitmap.get(row).copied())
                .is_some_and(|bits| bits & (1 << column.min(7)) != 0);
            if lit {
                put(img, px, py, colour);
            }
        }
    }
}

fn put(img: &mut RgbImage, x: i64, y: i64, colour: Rgb<u8>) {
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, colour);
        }
    }
}

fn fill_rect(img: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, colour: Rgb<u8>) {
    for dy in 0..h {
        for dx in 0..w {
            put(img, x + dx, y + dy, colour);
        }
    }
}

/// Bresenham line between two points, clipped to the image.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), colour: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(img, x, y, colour);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_thick_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), colour: Rgb<u8>) {
    draw_line(img, from, to, colour);
    draw_line(img, (from.0, from.1 + 1), (to.0, to.1 + 1), colour);
    draw_line(img, (from.0 + 1, from.1), (to.0 + 1, to.1), colour);
}
