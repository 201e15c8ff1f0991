//! Histogram binning and boxplot summaries for the distribution views.

use serde::Serialize;

use crate::describe::quantile_sorted;
use crate::errors::AnalyticsError;

/// Upper bound on the bin count. Requests above it are clamped; the bin
/// count reaches a handler straight from the query string, so it must
/// not size an allocation unchecked.
pub const MAX_BINS: usize = 1_000;

/// Equal-width histogram over the observed range.
#[derive(Clone, Debug, Serialize)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

pub fn histogram(series: &[f64], bins: usize) -> Result<Histogram, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }
    let bins = bins.clamp(1, MAX_BINS);

    let min = series.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // Constant series collapses into a single bucket.
    if min == max {
        return Ok(Histogram {
            start: min,
            bin_width: 0.0,
            counts: vec![series.len()],
        });
    }

    let bin_width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in series {
        let idx = ((v - min) / bin_width) as usize;
        // The maximum lands exactly on the right edge; keep it in the
        // last bucket.
        counts[idx.min(bins - 1)] += 1;
    }

    Ok(Histogram {
        start: min,
        bin_width,
        counts,
    })
}

/// Five-number summary plus mean, the boxplot trace input.
#[derive(Clone, Debug, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

pub fn box_stats(series: &[f64]) -> Result<BoxStats, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }

    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(BoxStats {
        min: sorted[0],
        q1: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q3: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
        mean: series.iter().sum::<f64>() / series.len() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_cover_all_observations() {
        let series: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let hist = histogram(&series, 10).unwrap();

        assert_eq!(hist.counts.len(), 10);
        assert_eq!(hist.counts.iter().sum::<usize>(), 100);
        assert_eq!(hist.counts, vec![10; 10]);
    }

    #[test]
    fn test_histogram_max_value_in_last_bucket() {
        let hist = histogram(&[0.0, 0.5, 1.0], 2).unwrap();
        assert_eq!(hist.counts, vec![2, 1]);
    }

    #[test]
    fn test_histogram_clamps_oversized_bin_count() {
        let hist = histogram(&[1.0, 2.0, 3.0], usize::MAX).unwrap();
        assert_eq!(hist.counts.len(), MAX_BINS);
        assert_eq!(hist.counts.iter().sum::<usize>(), 3);

        let hist = histogram(&[1.0, 2.0, 3.0], 0).unwrap();
        assert_eq!(hist.counts.len(), 1);
    }

    #[test]
    fn test_histogram_constant_series() {
        let hist = histogram(&[3.0, 3.0, 3.0], 10).unwrap();
        assert_eq!(hist.counts, vec![3]);
        assert_eq!(hist.bin_width, 0.0);
    }

    #[test]
    fn test_box_stats() {
        let stats = box_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
        assert!((stats.median - 2.5).abs() < 1e-9);
        assert!((stats.q1 - 1.75).abs() < 1e-9);
        assert!((stats.q3 - 3.25).abs() < 1e-9);
        assert!((stats.mean - 2.5).abs() < 1e-9);
    }
}
