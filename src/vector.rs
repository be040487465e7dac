//! Vector type for ThinkGrid.
//!
//! A behavioral fingerprint is an ordered sequence of `f64` components.
//! Dimension is fixed within an entity's group but may differ across entities.

use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A dense real-valued vector.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    /// Create a vector from raw components.
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Create a new zero vector of given dimensionality.
    pub fn zeros(dimensions: usize) -> Self {
        Self {
            data: vec![0.0; dimensions],
        }
    }

    /// Get the dimensionality.
    pub fn dimensions(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the raw data as a slice.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Compute the L2 norm.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|&v| v * v).sum::<f64>().sqrt()
    }

    /// Return a unit-L2 copy. Zero vectors stay zero.
    ///
    /// Components are first scaled by the largest magnitude, so the norm
    /// cannot overflow for any finite vector.
    pub fn l2_normalized(&self) -> Vector {
        let max_abs = self.data.iter().fold(0.0_f64, |m, &v| m.max(v.abs()));
        if max_abs == 0.0 || !max_abs.is_finite() {
            return self.clone();
        }
        let scaled: Vec<f64> = self.data.iter().map(|&v| v / max_abs).collect();
        let inv = 1.0 / scaled.iter().map(|&v| v * v).sum::<f64>().sqrt();
        Vector::new(scaled.into_iter().map(|v| v * inv).collect())
    }

    /// Check that the vector is non-empty and every component is finite.
    pub fn validate(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(GridError::EmptyInput("vector must be non-empty".into()));
        }
        match self.data.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(GridError::NonFinite {
                index,
                value: self.data[index],
            }),
            None => Ok(()),
        }
    }

    /// Fail with [`GridError::DimensionMismatch`] unless `self` has `expected` components.
    pub fn ensure_dimensions(&self, expected: usize) -> Result<()> {
        if self.data.len() != expected {
            return Err(GridError::DimensionMismatch {
                expected,
                got: self.data.len(),
            });
        }
        Ok(())
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

impl From<&[f64]> for Vector {
    fn from(data: &[f64]) -> Self {
        Self::new(data.to_vec())
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let v = Vector::zeros(100);
        assert_eq!(v.dimensions(), 100);
        assert!(v.data().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_norm() {
        let v = Vector::new(vec![3.0, 4.0]);
        assert!((v.norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_l2_normalized() {
        let v = Vector::new(vec![3.0, 4.0]).l2_normalized();
        assert!((v[0] - 0.6).abs() < 1e-12);
        assert!((v[1] - 0.8).abs() < 1e-12);
        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_l2_normalized_huge_components() {
        let v = Vector::new(vec![1e308, -1e308]);
        assert!(v.norm().is_infinite());

        let n = v.l2_normalized();
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert!((n[0] - half).abs() < 1e-12);
        assert!((n[1] + half).abs() < 1e-12);
        assert!((n.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_stays_zero() {
        let v = Vector::zeros(3).l2_normalized();
        assert_eq!(v, Vector::zeros(3));
    }

    #[test]
    fn test_validate_rejects_empty_and_non_finite() {
        assert!(matches!(
            Vector::new(vec![]).validate(),
            Err(GridError::EmptyInput(_))
        ));
        assert!(matches!(
            Vector::new(vec![1.0, f64::NAN]).validate(),
            Err(GridError::NonFinite { index: 1, .. })
        ));
        assert!(matches!(
            Vector::new(vec![f64::INFINITY]).validate(),
            Err(GridError::NonFinite { index: 0, .. })
        ));
        assert!(Vector::new(vec![1.0, -2.5]).validate().is_ok());
    }

    #[test]
    fn test_ensure_dimensions() {
        let v = Vector::new(vec![1.0, 2.0]);
        assert!(v.ensure_dimensions(2).is_ok());
        assert_eq!(
            v.ensure_dimensions(3),
            Err(GridError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        );
    }
}
