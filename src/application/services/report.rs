use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::entities::artifact::Artifact;
use crate::domain::entities::sample::Sample;
use crate::domain::ports::renderer::{
    ChartRenderer, DocumentComposer, RenderError, ReportDocument, Series,
};

pub const REPORT_TITLE: &str = "System Health Report";
pub const CHART_CAPTION: &str = "System Health Over Time";
pub const REPORT_BODY: &str = "Please find the attached system health report.";

/// Layout size of the chart on the report page, in points.
const CHART_WIDTH_PT: f32 = 400.0;
const CHART_HEIGHT_PT: f32 = 300.0;

/// Subject line of the report mail for the given day.
#[must_use]
pub fn report_subject(date: NaiveDate) -> String {
    format!("Automated System Health Report - {}", date.format("%Y-%m-%d"))
}

/// Renders the history chart, then composes the report around it.
///
/// Both files live at fixed paths and are overwritten on every run. The chart
/// stays on disk after the report is built; only the report is handed on.
pub struct ReportBuilder<'a> {
    chart: &'a dyn ChartRenderer,
    composer: &'a dyn DocumentComposer,
    chart_path: PathBuf,
    report_path: PathBuf,
}

impl<'a> ReportBuilder<'a> {
    #[must_use]
    pub fn new(
        chart: &'a dyn ChartRenderer,
        composer: &'a dyn DocumentComposer,
        chart_path: impl Into<PathBuf>,
        report_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            chart,
            composer,
            chart_path: chart_path.into(),
            report_path: report_path.into(),
        }
    }

    #[must_use]
    pub fn chart_path(&self) -> &Path {
        &self.chart_path
    }

    #[must_use]
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Build the chart and the report for `history`, summarising `latest`
    /// as observed on `os_name`.
    ///
    /// `history` may be empty; the chart then shows axes and legend only.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if either file cannot be produced. A failed
    /// chart aborts before the report is attempted.
    pub fn build(
        &self,
        history: &[Sample],
        latest: &Sample,
        os_name: &str,
    ) -> Result<Artifact, RenderError> {
        self.chart.render(history, &self.chart_path)?;

        let document = self.document(history, latest, os_name);
        self.composer.compose(&document, &self.report_path)?;

        tracing::info!(
            path = %self.report_path.display(),
            samples = history.len(),
            "report built"
        );
        Ok(Artifact::report(self.report_path.clone()))
    }

    /// Structured report content. Exposed for inspection in tests.
    #[must_use]
    pub fn document(&self, history: &[Sample], latest: &Sample, os_name: &str) -> ReportDocument {
        ReportDocument {
            title: REPORT_TITLE.to_string(),
            subtitle: Some(format!("Generated {}", latest.formatted_timestamp())),
            summary: summary_lines(latest, os_name),
            chart_caption: CHART_CAPTION.to_string(),
            chart_notes: chart_notes(history),
            chart_image: self.chart_path.clone(),
            chart_width: CHART_WIDTH_PT,
            chart_height: CHART_HEIGHT_PT,
        }
    }
}

fn summary_lines(latest: &Sample, os_name: &str) -> Vec<(String, String)> {
    let mut lines = vec![("Operating System".to_string(), os_name.to_string())];
    lines.extend(
        Series::ALL
            .iter()
            .map(|s| (s.label().to_string(), format!("{:.1}%", s.value(latest)))),
    );
    lines
}

fn chart_notes(history: &[Sample]) -> Vec<String> {
    let legend = Series::ALL
        .iter()
        .map(|s| format!("{} ({})", s.label(), s.colour_name()))
        .collect::<Vec<_>>()
        .join(", ");

    let range = match (history.first(), history.last()) {
        (Some(first), Some(last)) => format!(
            "{} samples from {} to {}",
            history.len(),
            first.formatted_timestamp(),
            last.formatted_timestamp()
        ),
        _ => "No samples recorded yet".to_string(),
    };

    vec![
        format!("Legend: {legend}"),
        "Usage (%) vs Time".to_string(),
        range,
    ]
}
