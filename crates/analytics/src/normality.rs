//! D'Agostino-Pearson omnibus normality test.
//!
//! The combined K² statistic of the skewness and kurtosis z-scores,
//! the same test `scipy.stats.normaltest` runs for the dashboard
//! caption. K² is chi-squared with two degrees of freedom under the
//! null, whose survival function is simply `exp(-k2 / 2)`.

use serde::Serialize;

use crate::errors::AnalyticsError;

/// Significance threshold for the normal / not-normal verdict.
pub const P_THRESHOLD: f64 = 0.05;

/// Observations below which the z-score approximations break down.
const MIN_OBSERVATIONS: usize = 8;

#[derive(Clone, Debug, Serialize)]
pub struct NormalTest {
    pub statistic: f64,
    pub p_value: f64,
    /// `p_value > 0.05`, the verdict the dashboard prints.
    pub is_normal: bool,
}

pub fn normal_test(series: &[f64]) -> Result<NormalTest, AnalyticsError> {
    let n = series.len();
    if n < MIN_OBSERVATIONS {
        return Err(AnalyticsError::InsufficientData {
            needed: MIN_OBSERVATIONS,
            got: n,
        });
    }

    let moments = Moments::of(series)?;
    let z_skew = skew_zscore(moments.g1, n as f64);
    let z_kurt = kurtosis_zscore(moments.b2, n as f64);

    let statistic = z_skew * z_skew + z_kurt * z_kurt;
    let p_value = (-statistic / 2.0).exp();

    Ok(NormalTest {
        statistic,
        p_value,
        is_normal: p_value > P_THRESHOLD,
    })
}

struct Moments {
    /// Sample skewness `m3 / m2^(3/2)`.
    g1: f64,
    /// Sample kurtosis `m4 / m2^2` (Pearson, not excess).
    b2: f64,
}

impl Moments {
    fn of(series: &[f64]) -> Result<Self, AnalyticsError> {
        let n = series.len() as f64;
        let mean = series.iter().sum::<f64>() / n;

        let central = |p: i32| series.iter().map(|v| (v - mean).powi(p)).sum::<f64>() / n;
        let m2 = central(2);
        if m2 == 0.0 {
            return Err(AnalyticsError::DegenerateSeries);
        }

        Ok(Self {
            g1: central(3) / m2.powf(1.5),
            b2: central(4) / (m2 * m2),
        })
    }
}

/// Z-score of sample skewness (D'Agostino 1970).
fn skew_zscore(g1: f64, n: f64) -> f64 {
    let y = g1 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / w2.sqrt().ln().sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    delta * (y / alpha).asinh()
}

/// Z-score of sample kurtosis (Anscombe & Glynn 1983).
fn kurtosis_zscore(b2: f64, n: f64) -> f64 {
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let variance = 24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0).powi(2) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / variance.sqrt();

    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());

    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    let term = ((1.0 - 2.0 / a) / denom).cbrt();
    ((1.0 - 2.0 / (9.0 * a)) - term) / (2.0 / (9.0 * a)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_minimum_observations() {
        let err = normal_test(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let err = normal_test(&[5.0; 50]).unwrap_err();
        assert!(matches!(err, AnalyticsError::DegenerateSeries));
    }

    #[test]
    fn test_p_value_is_a_probability() {
        let series: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin()).collect();
        let result = normal_test(&series).unwrap();

        assert!(result.statistic.is_finite());
        assert!(result.statistic >= 0.0);
        assert!((0.0..=1.0).contains(&result.p_value));
    }

    #[test]
    fn test_uniform_data_is_rejected() {
        // A flat ramp is strongly platykurtic; at n = 500 the kurtosis
        // z-score alone is far past any reasonable threshold.
        let series: Vec<f64> = (0..500).map(|i| i as f64).collect();
        let result = normal_test(&series).unwrap();
        assert!(!result.is_normal);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_heavily_skewed_data_is_rejected() {
        let series: Vec<f64> = (0..200).map(|i| (i as f64 / 20.0).exp()).collect();
        let result = normal_test(&series).unwrap();
        assert!(!result.is_normal);
    }

    #[test]
    fn test_symmetric_data_has_small_skew_component() {
        // Symmetric input: the skew z-score is ~0, so the statistic is
        // dominated by the kurtosis component.
        let series: Vec<f64> = (-100..=100).map(|i| i as f64).collect();
        let moments = Moments::of(&series).unwrap();
        assert!(moments.g1.abs() < 1e-12);
        assert!(skew_zscore(moments.g1, series.len() as f64).abs() < 1e-9);
    }
}
