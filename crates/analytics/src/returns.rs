//! Percentage-change return series and level reconstruction.

use marketlens_market_data::{OhlcvColumn, OhlcvTable};

use crate::errors::AnalyticsError;

/// One-period percentage change. The first observation has no
/// predecessor and is dropped, so the result is one shorter than the
/// input.
///
/// A zero predecessor yields an infinite (or NaN) return; volume
/// columns hit this on halted or illiquid sessions. The values are kept
/// as-is, matching pandas `pct_change` semantics, and serialize as JSON
/// null downstream.
pub fn pct_change(series: &[f64]) -> Vec<f64> {
    series
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Rebuild the level series from its first value and a pct-change
/// series. Inverse of [`pct_change`] up to floating-point error:
/// `cumulative_from(s[0], &pct_change(s)) ~ s`.
pub fn cumulative_from(first: f64, returns: &[f64]) -> Vec<f64> {
    let mut levels = Vec::with_capacity(returns.len() + 1);
    let mut current = first;
    levels.push(current);
    for r in returns {
        current *= 1.0 + r;
        levels.push(current);
    }
    levels
}

/// Total percentage change over the series: `(last - first) / first * 100`.
pub fn total_change_pct(series: &[f64]) -> Result<f64, AnalyticsError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AnalyticsError::EmptySeries),
    };
    Ok((last - first) / first * 100.0)
}

/// Per-column pct-change series for a whole table.
#[derive(Clone, Debug, serde::Serialize)]
pub struct TableReturns {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

pub fn table_returns(table: &OhlcvTable) -> TableReturns {
    TableReturns {
        open: pct_change(&table.column(OhlcvColumn::Open)),
        high: pct_change(&table.column(OhlcvColumn::High)),
        low: pct_change(&table.column(OhlcvColumn::Low)),
        close: pct_change(&table.column(OhlcvColumn::Close)),
        volume: pct_change(&table.column(OhlcvColumn::Volume)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_pct_change_drops_first_observation() {
        let returns = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert_close(returns[0], 0.1);
        assert_close(returns[1], -0.1);
    }

    #[test]
    fn test_pct_change_of_single_value_is_empty() {
        assert!(pct_change(&[42.0]).is_empty());
        assert!(pct_change(&[]).is_empty());
    }

    #[test]
    fn test_zero_predecessor_yields_non_finite_return() {
        // Zero-volume sessions produce inf/NaN rather than an error.
        let returns = pct_change(&[0.0, 5.0, 0.0, 0.0]);
        assert!(returns[0].is_infinite());
        assert_close(returns[1], -1.0);
        assert!(returns[2].is_nan());
    }

    #[test]
    fn test_round_trip_reconstructs_levels() {
        let closes = [
            100.0, 101.5, 99.25, 103.75, 103.75, 97.0, 112.625, 110.0, 121.375,
        ];
        let returns = pct_change(&closes);
        let rebuilt = cumulative_from(closes[0], &returns);

        assert_eq!(rebuilt.len(), closes.len());
        for (orig, back) in closes.iter().zip(&rebuilt) {
            assert!((orig - back).abs() < 1e-9 * orig.abs());
        }
    }

    #[test]
    fn test_total_change_pct() {
        assert_close(total_change_pct(&[100.0, 150.0]).unwrap(), 50.0);
        assert_close(total_change_pct(&[200.0, 100.0]).unwrap(), -50.0);
        assert!(matches!(
            total_change_pct(&[]),
            Err(AnalyticsError::EmptySeries)
        ));
    }
}
