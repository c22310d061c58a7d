use colored::{ColoredString, Colorize};

use crate::domain::entities::sample::Sample;

/// Usage at or above this is drawn red.
const CRITICAL_PERCENT: f64 = 90.0;
/// Usage at or above this is drawn yellow.
const WARNING_PERCENT: f64 = 70.0;

#[must_use]
pub fn progress_bar(value: f64, width: usize) -> String {
    let ratio = (value / 100.0).clamp(0.0, 1.0);
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_filled = "█".repeat(filled);
    let bar_empty = "░".repeat(empty);

    let colored_bar = if value >= CRITICAL_PERCENT {
        bar_filled.red().bold()
    } else if value >= WARNING_PERCENT {
        bar_filled.yellow()
    } else {
        bar_filled.green()
    };

    format!("{colored_bar}{bar_empty}")
}

#[must_use]
pub fn colorize_percent(value: f64) -> ColoredString {
    let text = format!("{value:.1}%");
    if value >= CRITICAL_PERCENT {
        text.red().bold()
    } else if value >= WARNING_PERCENT {
        text.yellow()
    } else {
        text.green()
    }
}

pub fn print_section_header(title: &str) {
    println!("{}", title.bold().cyan());
    let display_width = title.chars().count();
    println!("{}", "─".repeat(display_width).cyan());
}

/// One aligned "label  bar  value" line per metric of `sample`.
#[must_use]
pub fn format_usage_lines(sample: &Sample, width: usize) -> Vec<String> {
    [
        ("CPU", sample.cpu_pct),
        ("Memory", sample.mem_pct),
        ("Disk", sample.disk_pct),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            "  {label:<7} {} {}",
            progress_bar(*value, width),
            colorize_percent(*value)
        )
    })
    .collect()
}

/// Fixed-width table of samples, one row each, in the given order.
#[must_use]
pub fn format_sample_table(samples: &[Sample]) -> String {
    let header = format!(
        "{:<20} {:>7} {:>7} {:>7}  {:<12}",
        "TIMESTAMP", "CPU%", "MEM%", "DISK%", "OS"
    );
    let separator = "─".repeat(header.chars().count());

    let mut rows = vec![header, separator];
    for s in samples {
        rows.push(format!(
            "{:<20} {:>7.1} {:>7.1} {:>7.1}  {:<12}",
            s.formatted_timestamp(),
            s.cpu_pct,
            s.mem_pct,
            s.disk_pct,
            s.os_name
        ));
    }
    rows.join("\n")
}
