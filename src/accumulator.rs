//! Accumulator: weighted running sums for centroid computation.
//!
//! Every centroid in the crate (store aggregates, compressor centroids) is a
//! weighted arithmetic mean built by feeding vectors into an [`Accumulator`]
//! and reading [`Accumulator::mean`]. An unweighted mean is the special case
//! where every weight is 1.

use crate::error::{GridError, Result};
use crate::vector::Vector;

/// A weighted, dimension-checked running sum.
#[derive(Clone, Debug)]
pub struct Accumulator {
    /// Running weighted sum per dimension
    sums: Vec<f64>,
    /// Sum of all weights added
    weight_sum: f64,
    /// Number of examples accumulated
    count: usize,
}

impl Accumulator {
    /// Create a new empty accumulator.
    pub fn new(dimensions: usize) -> Self {
        Self {
            sums: vec![0.0; dimensions],
            weight_sum: 0.0,
            count: 0,
        }
    }

    /// Get the dimensionality.
    pub fn dimensions(&self) -> usize {
        self.sums.len()
    }

    /// Get the number of accumulated examples.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    /// Add an example with weight 1.
    pub fn add(&mut self, example: &[f64]) -> Result<()> {
        self.add_weighted(example, 1.0)
    }

    /// Add an example with a specific weight.
    pub fn add_weighted(&mut self, example: &[f64], weight: f64) -> Result<()> {
        if example.len() != self.sums.len() {
            return Err(GridError::DimensionMismatch {
                expected: self.sums.len(),
                got: example.len(),
            });
        }

        for (sum, &v) in self.sums.iter_mut().zip(example.iter()) {
            *sum += v * weight;
        }
        self.weight_sum += weight;
        self.count += 1;
        Ok(())
    }

    /// Weighted mean of everything added so far.
    ///
    /// Returns `None` when the total weight is zero.
    pub fn mean(&self) -> Option<Vector> {
        if self.weight_sum == 0.0 {
            return None;
        }
        Some(Vector::new(
            self.sums.iter().map(|&s| s / self.weight_sum).collect(),
        ))
    }

    /// Get the raw weighted sums.
    pub fn raw_sums(&self) -> &[f64] {
        &self.sums
    }
}

/// Weighted centroid of `vectors`.
///
/// Falls back to the first vector when all weights are zero, and to an empty
/// vector when `vectors` is empty.
pub(crate) fn weighted_centroid(vectors: &[&[f64]], weights: &[f64]) -> Result<Vector> {
    let Some(first) = vectors.first() else {
        return Ok(Vector::default());
    };
    if weights.len() != vectors.len() {
        return Err(GridError::InvalidParameter {
            name: "weights",
            reason: format!("{} weights for {} vectors", weights.len(), vectors.len()),
        });
    }

    let mut acc = Accumulator::new(first.len());
    for (v, &w) in vectors.iter().zip(weights.iter()) {
        acc.add_weighted(v, w)?;
    }
    Ok(acc.mean().unwrap_or_else(|| Vector::from(*first)))
}
