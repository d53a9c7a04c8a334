//! Report generation port trait.

use std::path::Path;
use std::str::FromStr;

use crate::domain::error::ScreenerError;
use crate::domain::screen::ScreenReport;

/// Which layout a scan result is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanView {
    /// One score card per ticker.
    #[default]
    Cards,
    /// A single table ordered by composite score.
    Ranking,
}

impl FromStr for ScanView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "cards" => Ok(ScanView::Cards),
            "ranking" => Ok(ScanView::Ranking),
            other => Err(format!("unknown view {:?} (expected cards or ranking)", other)),
        }
    }
}

/// Context that is not part of the screen result itself.
pub struct ReportMeta<'a> {
    pub provider: &'a str,
    pub generated: chrono::NaiveDateTime,
}

/// Port for writing scan reports.
pub trait ReportPort {
    fn write(
        &self,
        report: &ScreenReport,
        view: ScanView,
        meta: &ReportMeta<'_>,
        output_path: &Path,
    ) -> Result<(), ScreenerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_view_parsing() {
        assert_eq!("".parse::<ScanView>(), Ok(ScanView::Cards));
        assert_eq!("Ranking".parse::<ScanView>(), Ok(ScanView::Ranking));
        assert!("grid".parse::<ScanView>().is_err());
    }
}
