//! HTML report adapter implementing ReportPort.
//!
//! Writes a single self-contained page (inline CSS, no scripts) with the
//! same cards or ranking table the dashboard shows.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::adapters::web::templates::ScanDisplay;
use crate::domain::error::ScreenerError;
use crate::domain::screen::ScreenReport;
use crate::ports::report_port::{ReportMeta, ReportPort, ScanView};

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    generated: String,
    provider: String,
    screened: usize,
    failed: usize,
    show_cards: bool,
    scan: ScanDisplay,
}

#[derive(Default)]
pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        report: &ScreenReport,
        view: ScanView,
        meta: &ReportMeta<'_>,
    ) -> Result<String, ScreenerError> {
        let template = ReportTemplate {
            generated: meta.generated.format("%Y-%m-%d %H:%M").to_string(),
            provider: meta.provider.to_string(),
            screened: report.results.len(),
            failed: report.failures.len(),
            show_cards: view == ScanView::Cards,
            scan: ScanDisplay::from_report(report),
        };
        template
            .render()
            .map_err(|e| ScreenerError::Io(std::io::Error::other(e.to_string())))
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(
        &self,
        report: &ScreenReport,
        view: ScanView,
        meta: &ReportMeta<'_>,
        output_path: &Path,
    ) -> Result<(), ScreenerError> {
        let html = self.render(report, view, meta)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;
        Ok(())
    }
}
