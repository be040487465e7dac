//! Distance metrics for vector comparison.
//!
//! The compressor takes its distance as a plain function reference
//! ([`DistanceFn`]), so any `fn(&[f64], &[f64]) -> f64` can be plugged in.
//! [`Metric`] names the built-in choices.

use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};

/// Distance strategy: lower values mean closer vectors.
///
/// Callers guarantee both slices have the same length.
pub type DistanceFn = fn(&[f64], &[f64]) -> f64;

/// Built-in distance metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    /// Euclidean (L2) distance
    #[default]
    Euclidean,
    /// Manhattan (L1) distance
    Manhattan,
    /// Chebyshev (L∞) distance
    Chebyshev,
    /// Cosine distance: 1 - cosine similarity
    Cosine,
}

impl Metric {
    /// The function implementing this metric.
    pub fn distance_fn(self) -> DistanceFn {
        match self {
            Metric::Euclidean => Distance::euclidean,
            Metric::Manhattan => Distance::manhattan,
            Metric::Chebyshev => Distance::chebyshev,
            Metric::Cosine => Distance::cosine,
        }
    }

    /// Compute the distance between `a` and `b` with this metric.
    pub fn compute(self, a: &[f64], b: &[f64]) -> f64 {
        (self.distance_fn())(a, b)
    }
}

/// Distance computation for vectors.
pub struct Distance;

impl Distance {
    /// Euclidean distance.
    ///
    /// # Panics
    /// Panics if the slices differ in length.
    pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len(), "Dimension mismatch in euclidean");

        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| {
                let diff = x - y;
                diff * diff
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Euclidean distance that reports a length mismatch instead of panicking.
    pub fn checked_euclidean(a: &[f64], b: &[f64]) -> Result<f64> {
        if a.len() != b.len() {
            return Err(GridError::DimensionMismatch {
                expected: a.len(),
                got: b.len(),
            });
        }
        Ok(Self::euclidean(a, b))
    }

    /// Manhattan distance: sum of absolute differences.
    pub fn manhattan(a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len(), "Dimension mismatch in manhattan");

        a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs()).sum()
    }

    /// Chebyshev distance: maximum absolute difference.
    pub fn chebyshev(a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len(), "Dimension mismatch in chebyshev");

        a.iter()
            .zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    /// Cosine distance in `[0, 2]`.
    ///
    /// A zero vector has no direction; its distance to anything is 1.
    pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len(), "Dimension mismatch in cosine");

        let mut dot = 0.0_f64;
        let mut norm_a = 0.0_f64;
        let mut norm_b = 0.0_f64;
        for (&x, &y) in a.iter().zip(b.iter()) {
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }

        let norm_product = (norm_a * norm_b).sqrt();
        if norm_product < 1e-12 {
            return 1.0;
        }

        1.0 - dot / norm_product
    }
}
