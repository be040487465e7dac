//! Order statistics and dispersion summaries.
//!
//! Quantiles use linear interpolation between the two nearest order
//! statistics: for `p` in `(0, 1)` the fractional rank is `p * (n - 1)`.

use serde::{Deserialize, Serialize};

/// Clamp a value into `[0, 1]`.
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Sort a copy of `values` ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut s = values.to_vec();
    s.sort_by(f64::total_cmp);
    s
}

/// Interpolated quantile of an already-sorted slice.
///
/// Returns 0.0 for an empty slice.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return 0.0;
    };
    if p <= 0.0 {
        return first;
    }
    if p >= 1.0 {
        return last;
    }

    let idx = p * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    let frac = idx - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Interpolated quantile of unsorted values.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    quantile_sorted(&sorted(values), p)
}

/// Arithmetic mean and population standard deviation.
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Summary of member-to-centroid distances for one group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceStats {
    pub dim: usize,
    pub mean_distance: f64,
    pub max_distance: f64,
    pub min_distance: f64,
    pub std_distance: f64,
    /// `max_distance - min_distance`
    pub spread: f64,
    /// 90th-percentile distance
    #[serde(rename = "radiusP90")]
    pub radius_p90: f64,
}

impl DistanceStats {
    /// Summarize `distances`; an empty set yields all-zero statistics.
    pub fn summarize(distances: &[f64], dim: usize) -> Self {
        if distances.is_empty() {
            return Self {
                dim,
                mean_distance: 0.0,
                max_distance: 0.0,
                min_distance: 0.0,
                std_distance: 0.0,
                spread: 0.0,
                radius_p90: 0.0,
            };
        }

        let s = sorted(distances);
        let min = s[0];
        let max = s[s.len() - 1];
        let (mean, std) = mean_std(distances);

        Self {
            dim,
            mean_distance: mean,
            max_distance: max,
            min_distance: min,
            std_distance: std,
            spread: max - min,
            radius_p90: quantile_sorted(&s, 0.9),
        }
    }

    /// Whether every statistic is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.mean_distance,
            self.max_distance,
            self.min_distance,
            self.std_distance,
            self.spread,
            self.radius_p90,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
