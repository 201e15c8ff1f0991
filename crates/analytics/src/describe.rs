//! Summary statistics in the shape of a pandas `describe()` block.

use serde::Serialize;

use marketlens_market_data::{OhlcvColumn, OhlcvTable};

use crate::errors::AnalyticsError;

/// Eight-number summary for one column.
#[derive(Clone, Debug, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

pub fn describe(series: &[f64]) -> Result<Describe, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }

    let n = series.len();
    let mean = series.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let ss = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
        (ss / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(Describe {
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Linear-interpolation quantile over an ascending-sorted slice, the
/// default interpolation pandas and numpy use.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Per-column describe for a whole table, in column order.
pub fn describe_table(table: &OhlcvTable) -> Result<Vec<(&'static str, Describe)>, AnalyticsError> {
    OhlcvColumn::ALL
        .iter()
        .map(|col| Ok((col.as_str(), describe(&table.column(*col))?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_describe_matches_pandas_on_small_series() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0]).unwrap();

        assert_eq!(d.count, 4);
        assert_close(d.mean, 2.5);
        assert_close(d.std, (5.0f64 / 3.0).sqrt());
        assert_close(d.min, 1.0);
        assert_close(d.q25, 1.75);
        assert_close(d.median, 2.5);
        assert_close(d.q75, 3.25);
        assert_close(d.max, 4.0);
    }

    #[test]
    fn test_describe_is_order_independent() {
        let a = describe(&[3.0, 1.0, 4.0, 2.0]).unwrap();
        let b = describe(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_close(a.median, b.median);
        assert_close(a.q25, b.q25);
    }

    #[test]
    fn test_describe_single_observation() {
        let d = describe(&[7.0]).unwrap();
        assert_eq!(d.count, 1);
        assert_close(d.mean, 7.0);
        assert_close(d.median, 7.0);
        assert!(d.std.is_nan());
    }

    #[test]
    fn test_describe_empty_fails() {
        assert!(matches!(describe(&[]), Err(AnalyticsError::EmptySeries)));
    }

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [10.0, 20.0, 30.0];
        assert_close(quantile_sorted(&sorted, 0.0), 10.0);
        assert_close(quantile_sorted(&sorted, 0.5), 20.0);
        assert_close(quantile_sorted(&sorted, 0.75), 25.0);
        assert_close(quantile_sorted(&sorted, 1.0), 30.0);
    }
}
