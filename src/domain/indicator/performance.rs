//! Trailing price performance over fixed session counts.

use crate::domain::price::PriceSeries;

/// Trading sessions in roughly one, three and six months.
pub const SESSIONS_1M: usize = 21;
pub const SESSIONS_3M: usize = 65;
pub const SESSIONS_6M: usize = 131;

/// Percent change from the close `sessions` bars ago to the latest close.
/// `None` when the history is too short or the base close is not positive.
pub fn trailing_return(series: &PriceSeries, sessions: usize) -> Option<f64> {
    let bars = series.bars();
    if sessions == 0 || bars.len() <= sessions {
        return None;
    }
    let last = bars[bars.len() - 1].close;
    let base = bars[bars.len() - 1 - sessions].close;
    if base <= 0.0 {
        return None;
    }
    Some((last / base - 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::series_from_closes;
    use approx::assert_relative_eq;

    #[test]
    fn return_over_window() {
        let mut closes = vec![100.0];
        closes.extend(std::iter::repeat_n(105.0, 20));
        closes.push(110.0);
        let series = series_from_closes(&closes);
        assert_relative_eq!(trailing_return(&series, SESSIONS_1M).unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn return_needs_base_bar() {
        let series = series_from_closes(&[100.0; 21]);
        assert_eq!(trailing_return(&series, SESSIONS_1M), None);
    }

    #[test]
    fn return_rejects_non_positive_base() {
        let series = series_from_closes(&[0.0, 1.0]);
        assert_eq!(trailing_return(&series, 1), None);
    }
}
