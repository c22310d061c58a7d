#![allow(clippy::expect_used)]

use chrono::NaiveDate;

use healthprobe::application::services::report::ReportBuilder;
use healthprobe::domain::entities::sample::Sample;
use healthprobe::domain::ports::store::HealthLog;
use healthprobe::infrastructure::persistence::csv_log::CsvHealthLog;
use healthprobe::infrastructure::rendering::pdf_document::PdfComposer;
use healthprobe::infrastructure::rendering::png_chart::{
    PngChartRenderer, CHART_HEIGHT, CHART_WIDTH,
};

fn latest() -> Sample {
    let ts = NaiveDate::from_ymd_opt(2024, 9, 1)
        .and_then(|d| d.and_hms_opt(18, 45, 0))
        .expect("valid date");
    Sample::new(ts, 12.5, 48.0, 71.2, "Linux")
}

fn count_named(dir: &std::path::Path, name: &str) -> usize {
    std::fs::read_dir(dir)
        .expect("list")
        .filter_map(Result::ok)
        .filter(|e| e.file_name() == name)
        .count()
}

#[test]
fn absent_log_still_produces_chart_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = CsvHealthLog::new(dir.path().join("missing.csv"));
    let history = log.read_all().expect("absent log is empty");
    assert!(history.is_empty());

    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let chart_path = dir.path().join("system_health_graph.png");
    let builder = ReportBuilder::new(
        &chart,
        &composer,
        &chart_path,
        dir.path().join("system_health_report.pdf"),
    );

    let artifact = builder
        .build(&history, &latest(), "Linux")
        .expect("empty history builds");

    assert_eq!(artifact.content_type(), "application/pdf");
    let png = std::fs::read(&chart_path).expect("chart written");
    assert!(!png.is_empty());
    let decoded = image::load_from_memory(&png).expect("valid png");
    assert_eq!((decoded.width(), decoded.height()), (CHART_WIDTH, CHART_HEIGHT));

    let pdf = std::fs::read(artifact.path()).expect("report written");
    assert!(pdf.starts_with(b"%PDF-"));
    assert!(pdf.ends_with(b"%%EOF\n"));
}

#[test]
fn rebuilding_overwrites_the_same_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let builder = ReportBuilder::new(
        &chart,
        &composer,
        dir.path().join("system_health_graph.png"),
        dir.path().join("system_health_report.pdf"),
    );
    let history = vec![latest()];

    builder.build(&history, &latest(), "Linux").expect("first build");
    builder.build(&history, &latest(), "Linux").expect("second build");

    assert_eq!(count_named(dir.path(), "system_health_report.pdf"), 1);
    assert_eq!(count_named(dir.path(), "system_health_graph.png"), 1);
    // No temporary siblings left behind by the atomic writes.
    assert_eq!(std::fs::read_dir(dir.path()).expect("list").count(), 2);
}

#[test]
fn report_text_carries_the_latest_sample() {
    let dir = tempfile::tempdir().expect("tempdir");
    let chart = PngChartRenderer::new();
    let composer = PdfComposer::new();
    let builder = ReportBuilder::new(
        &chart,
        &composer,
        dir.path().join("c.png"),
        dir.path().join("r.pdf"),
    );

    let artifact = builder
        .build(&[latest()], &latest(), "Linux")
        .expect("build");

    let pdf = std::fs::read(artifact.path()).expect("read");
    let text = String::from_utf8_lossy(&pdf);
    for needle in [
        "System Health Report",
        "Operating System:",
        "Linux",
        "12.5%",
        "48.0%",
        "71.2%",
        "System Health Over Time",
    ] {
        assert!(text.contains(needle), "missing {needle:?} in report");
    }
}
