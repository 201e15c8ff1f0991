//! Spearman rank correlation for the cross-symbol heatmap.

use serde::Serialize;

use crate::errors::AnalyticsError;

/// Labeled square correlation matrix.
#[derive(Clone, Debug, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `values[i][j]` is the correlation of series i and j.
    pub values: Vec<Vec<f64>>,
}

/// Spearman rank correlation matrix across the named series.
///
/// Histories of different lengths are aligned pairwise on their most
/// recent overlap, the closest equivalent of how the dashboard's
/// frame join treats symbols with shorter histories.
pub fn spearman_matrix(
    series: &[(String, Vec<f64>)],
) -> Result<CorrelationMatrix, AnalyticsError> {
    if series.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }

    let n = series.len();
    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let rho = spearman(&series[i].1, &series[j].1)?;
            values[i][j] = rho;
            values[j][i] = rho;
        }
    }

    Ok(CorrelationMatrix {
        labels: series.iter().map(|(name, _)| name.clone()).collect(),
        values,
    })
}

/// Spearman rho of two series, aligned on the most recent overlap.
pub fn spearman(left: &[f64], right: &[f64]) -> Result<f64, AnalyticsError> {
    let n = left.len().min(right.len());
    if n < 2 {
        return Err(AnalyticsError::InsufficientData { needed: 2, got: n });
    }

    let left_ranks = ranks(&left[left.len() - n..]);
    let right_ranks = ranks(&right[right.len() - n..]);
    pearson(&left_ranks, &right_ranks)
}

/// Average-tie ranks, 1-based.
fn ranks(series: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..series.len()).collect();
    order.sort_by(|&a, &b| series[a].total_cmp(&series[b]));

    let mut ranks = vec![0.0; series.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && series[order[j + 1]] == series[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

fn pearson(left: &[f64], right: &[f64]) -> Result<f64, AnalyticsError> {
    if left.len() != right.len() {
        return Err(AnalyticsError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    let n = left.len() as f64;
    let mean_l = left.iter().sum::<f64>() / n;
    let mean_r = right.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_l = 0.0;
    let mut var_r = 0.0;
    for (l, r) in left.iter().zip(right) {
        let dl = l - mean_l;
        let dr = r - mean_r;
        cov += dl * dr;
        var_l += dl * dl;
        var_r += dr * dr;
    }

    if var_l == 0.0 || var_r == 0.0 {
        return Err(AnalyticsError::DegenerateSeries);
    }
    Ok(cov / (var_l * var_r).sqrt())
}
