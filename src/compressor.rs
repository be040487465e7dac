//! Cognition compressor: reduce each entity's snapshots to a centroid,
//! a density score and dispersion statistics.
//!
//! # Algorithm (per entity group)
//!
//! 1. Validate every snapshot (non-empty entity id, non-empty finite vector,
//!    one dimension per group).
//! 2. Skip groups smaller than `min_snapshots`.
//! 3. Stable-sort by timestamp ascending.
//! 4. Optionally L2-normalize each vector.
//! 5. Weight by recency: `1 + recency_weight * age`, where `age` is the
//!    timestamp's position in `[0, 1]` across the group's time span.
//! 6. Weighted centroid.
//! 7. Distance of every vector to that centroid.
//! 8. Optionally keep only vectors whose distance lies between the
//!    interpolated lower and upper distance quantiles.
//! 9. Final centroid over the kept vectors (the full-set centroid if none survive).
//! 10. Summarize distances of the *full* set to the final centroid.
//! 11. `density = clamp01(1 - mean_distance)`.
//!
//! A centroid or statistic that overflows to a non-finite value fails the
//! group with [`GridError::Overflow`].
//!
//! A failing group is reported to the observer and left out of the output;
//! the rest of the batch is unaffected.
//!
//! # Example
//!
//! ```rust
//! use thinkgrid::compressor::{Compressor, CompressorConfig};
//! use thinkgrid::memory::Snapshot;
//!
//! let batch = vec![
//!     Snapshot::new("alpha", vec![1.0, 1.0], 1, "feed"),
//!     Snapshot::new("alpha", vec![1.0, 1.0], 2, "feed"),
//!     Snapshot::new("beta", vec![0.0, 4.0], 1, "feed"),
//! ];
//!
//! let compressor = Compressor::new(CompressorConfig::default())?;
//! let patterns = compressor.compress(&batch);
//!
//! assert_eq!(patterns.len(), 2);
//! assert_eq!(patterns[0].entity_id, "alpha");
//! assert_eq!(patterns[0].density, 1.0);
//! # Ok::<(), thinkgrid::GridError>(())
//! ```

use crate::accumulator::weighted_centroid;
use crate::distance::{DistanceFn, Metric};
use crate::error::{GridError, Result};
use crate::memory::Snapshot;
use crate::observer::{notify, CompressionObserver};
use crate::stats::{clamp01, quantile_sorted, sorted, DistanceStats};
use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Compressor settings that can be loaded from configuration files.
///
/// The distance strategy and observers are attached on [`Compressor`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompressorConfig {
    /// Groups with fewer snapshots are skipped
    pub min_snapshots: usize,
    /// Scale each vector to unit L2 norm before aggregation
    pub l2_normalize: bool,
    /// Lower distance quantile kept by outlier trimming
    pub trim_lower_quantile: Option<f64>,
    /// Upper distance quantile kept by outlier trimming
    pub trim_upper_quantile: Option<f64>,
    /// Linear uplift for newer snapshots; `<= 0` disables weighting
    pub recency_weight: f64,
    /// Built-in metric used unless a custom distance is attached
    pub metric: Metric,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            min_snapshots: 1,
            l2_normalize: false,
            trim_lower_quantile: None,
            trim_upper_quantile: None,
            recency_weight: 0.0,
            metric: Metric::Euclidean,
        }
    }
}

impl CompressorConfig {
    /// Reject quantile bounds outside `0 <= low < high <= 1` and a non-finite recency weight.
    pub fn validate(&self) -> Result<()> {
        if !self.recency_weight.is_finite() {
            return Err(GridError::InvalidParameter {
                name: "recency_weight",
                reason: format!("must be finite, got {}", self.recency_weight),
            });
        }
        self.trim_bounds().map(|_| ())
    }

    /// Resolved `(low, high)` trim quantiles, or `None` when trimming is off.
    fn trim_bounds(&self) -> Result<Option<(f64, f64)>> {
        let (low, high) = match (self.trim_lower_quantile, self.trim_upper_quantile) {
            (None, None) => return Ok(None),
            (low, high) => (low.unwrap_or(0.0), high.unwrap_or(1.0)),
        };
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(GridError::InvalidQuantiles {
                low: self.trim_lower_quantile,
                high: self.trim_upper_quantile,
            });
        }
        Ok(Some((low, high)))
    }
}

/// Compressed summary of one entity's snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedPattern {
    pub entity_id: String,
    pub centroid: Vector,
    /// Tightness of the group in `[0, 1]`; 1 means every member sits on the centroid.
    pub density: f64,
    pub snapshot_count: usize,
    pub stats: DistanceStats,
}

/// Groups snapshots by entity and compresses each group.
#[derive(Clone)]
pub struct Compressor {
    config: CompressorConfig,
    trim: Option<(f64, f64)>,
    distance: DistanceFn,
    observer: Option<Arc<dyn CompressionObserver>>,
}

impl Compressor {
    /// Create a compressor, validating `config`.
    pub fn new(config: CompressorConfig) -> Result<Self> {
        config.validate()?;
        let trim = config.trim_bounds()?;
        let distance = config.metric.distance_fn();
        Ok(Self {
            config,
            trim,
            distance,
            observer: None,
        })
    }

    /// Use a built-in metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.config.metric = metric;
        self.distance = metric.distance_fn();
        self
    }

    /// Use a custom distance function.
    pub fn with_distance(mut self, distance: DistanceFn) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn CompressionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Compress a batch of snapshots, one pattern per surviving entity.
    ///
    /// Patterns come out in order of each entity's first appearance in `batch`.
    pub fn compress(&self, batch: &[Snapshot]) -> Vec<CompressedPattern> {
        group_by_entity(batch)
            .iter()
            .filter_map(|(entity_id, group)| self.compress_entity(entity_id, group))
            .collect()
    }

    /// Parallel [`compress`](Self::compress); identical output and order.
    #[cfg(feature = "parallel")]
    pub fn compress_par(&self, batch: &[Snapshot]) -> Vec<CompressedPattern> {
        use rayon::prelude::*;

        let groups = group_by_entity(batch);
        let results: Vec<Option<CompressedPattern>> = groups
            .par_iter()
            .map(|(entity_id, group)| self.compress_entity(entity_id, group))
            .collect();
        results.into_iter().flatten().collect()
    }

    /// Compress one entity's snapshots, reporting failures to the observer.
    ///
    /// `None` when the group is skipped or fails.
    pub fn compress_entity(
        &self,
        entity_id: &str,
        group: &[Snapshot],
    ) -> Option<CompressedPattern> {
        match self.try_compress_group(entity_id, group) {
            Ok(Some(pattern)) => {
                if let Some(obs) = &self.observer {
                    notify("on_after", || obs.on_after(&pattern));
                }
                debug!(
                    entity_id,
                    snapshots = pattern.snapshot_count,
                    density = pattern.density,
                    "compressed entity group"
                );
                Some(pattern)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(entity_id, %error, "skipping entity group");
                if let Some(obs) = &self.observer {
                    notify("on_error", || obs.on_error(entity_id, &error));
                }
                None
            }
        }
    }

    fn try_compress_group(
        &self,
        entity_id: &str,
        group: &[Snapshot],
    ) -> Result<Option<CompressedPattern>> {
        let dim = validate_group(entity_id, group)?;

        if group.len() < self.config.min_snapshots {
            debug!(
                entity_id,
                count = group.len(),
                min_snapshots = self.config.min_snapshots,
                "group below min_snapshots"
            );
            return Ok(None);
        }

        if let Some(obs) = &self.observer {
            notify("on_before", || obs.on_before(entity_id, group));
        }

        let mut ordered: Vec<&Snapshot> = group.iter().collect();
        ordered.sort_by_key(|s| s.timestamp);

        let vectors: Vec<Vector> = ordered
            .iter()
            .map(|s| {
                if self.config.l2_normalize {
                    s.vector.l2_normalized()
                } else {
                    s.vector.clone()
                }
            })
            .collect();
        let timestamps: Vec<i64> = ordered.iter().map(|s| s.timestamp).collect();
        let weights = recency_weights(&timestamps, self.config.recency_weight);

        let mat: Vec<&[f64]> = vectors.iter().map(Vector::data).collect();
        let centroid = weighted_centroid(&mat, &weights)?;
        let distances = self.distances_to(&mat, &centroid);

        let keep = trim_mask(&distances, self.trim);
        let mut kept: Vec<&[f64]> = Vec::with_capacity(mat.len());
        let mut kept_weights: Vec<f64> = Vec::with_capacity(mat.len());
        for ((v, w), k) in mat.iter().zip(&weights).zip(&keep) {
            if *k {
                kept.push(*v);
                kept_weights.push(*w);
            }
        }

        let final_centroid = if kept.is_empty() {
            centroid
        } else {
            weighted_centroid(&kept, &kept_weights)?
        };

        if final_centroid.data().iter().any(|v| !v.is_finite()) {
            return Err(GridError::Overflow("centroid"));
        }
        let final_distances = self.distances_to(&mat, &final_centroid);
        let stats = DistanceStats::summarize(&final_distances, dim);
        if !stats.is_finite() {
            return Err(GridError::Overflow("distance statistics"));
        }
        let density = clamp01(1.0 - stats.mean_distance);

        Ok(Some(CompressedPattern {
            entity_id: entity_id.to_string(),
            centroid: final_centroid,
            density,
            snapshot_count: group.len(),
            stats,
        }))
    }

    fn distances_to(&self, mat: &[&[f64]], centroid: &Vector) -> Vec<f64> {
        mat.iter()
            .map(|v| (self.distance)(v, centroid.data()))
            .collect()
    }
}

impl Default for Compressor {
    fn default() -> Self {
        let config = CompressorConfig::default();
        Self {
            distance: config.metric.distance_fn(),
            config,
            trim: None,
            observer: None,
        }
    }
}

/// Group snapshots by entity id, preserving first-appearance order.
fn group_by_entity(batch: &[Snapshot]) -> Vec<(String, Vec<Snapshot>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<Snapshot>)> = Vec::new();
    for snap in batch {
        let slot = *index.entry(snap.entity_id.as_str()).or_insert_with(|| {
            groups.push((snap.entity_id.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(snap.clone());
    }
    groups
}

/// Validate a group and return its shared dimension.
fn validate_group(entity_id: &str, group: &[Snapshot]) -> Result<usize> {
    if entity_id.is_empty() {
        return Err(GridError::EmptyEntityId);
    }
    let first = group
        .first()
        .ok_or_else(|| GridError::EmptyInput(format!("no snapshots for {entity_id}")))?;
    let dim = first.vector.dimensions();
    for snap in group {
        snap.validate()?;
        snap.vector.ensure_dimensions(dim)?;
    }
    Ok(dim)
}

/// Deterministic recency weights for ascending `timestamps`.
fn recency_weights(timestamps: &[i64], recency_weight: f64) -> Vec<f64> {
    let (Some(&min_t), Some(&max_t)) = (timestamps.first(), timestamps.last()) else {
        return Vec::new();
    };
    if recency_weight <= 0.0 {
        return vec![1.0; timestamps.len()];
    }

    // i128 keeps the span exact for any pair of i64 timestamps
    let span = (i128::from(max_t) - i128::from(min_t)).max(1) as f64;
    timestamps
        .iter()
        .map(|&t| {
            let age = (i128::from(t) - i128::from(min_t)) as f64 / span;
            1.0 + recency_weight * age
        })
        .collect()
}

/// Keep-mask for distances within the interpolated `[low, high]` quantile band.
fn trim_mask(distances: &[f64], bounds: Option<(f64, f64)>) -> Vec<bool> {
    let Some((low, high)) = bounds else {
        return vec![true; distances.len()];
    };
    let s = sorted(distances);
    let t_low = quantile_sorted(&s, low);
    let t_high = quantile_sorted(&s, high);
    distances
        .iter()
        .map(|&d| d >= t_low && d <= t_high)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Distance;
    use parking_lot::Mutex;

    fn snap(entity: &str, v: Vec<f64>, t: i64) -> Snapshot {
        Snapshot::new(entity, v, t, "test")
    }

    fn default_compressor() -> Compressor {
        Compressor::new(CompressorConfig::default()).unwrap()
    }

    #[derive(Default)]
    struct RecordingObserver {
        before: Mutex<Vec<String>>,
        after: Mutex<Vec<String>>,
        errors: Mutex<Vec<(String, GridError)>>,
    }

    impl CompressionObserver for RecordingObserver {
        fn on_before(&self, entity_id: &str, _snapshots: &[Snapshot]) {
            self.before.lock().push(entity_id.to_string());
        }

        fn on_after(&self, pattern: &CompressedPattern) {
            self.after.lock().push(pattern.entity_id.clone());
        }

        fn on_error(&self, entity_id: &str, error: &GridError) {
            self.errors.lock().push((entity_id.to_string(), error.clone()));
        }
    }

    struct PanickingObserver;

    impl CompressionObserver for PanickingObserver {
        fn on_after(&self, _pattern: &CompressedPattern) {
            panic!("observer failure");
        }
    }

    #[test]
    fn test_identical_vectors_have_full_density() {
        let batch = vec![
            snap("a", vec![1.0, 1.0], 1),
            snap("a", vec![1.0, 1.0], 2),
            snap("a", vec![1.0, 1.0], 3),
        ];
        let patterns = default_compressor().compress(&batch);

        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.centroid.data(), &[1.0, 1.0]);
        assert_eq!(p.density, 1.0);
        assert_eq!(p.snapshot_count, 3);
        assert_eq!(p.stats.dim, 2);
        assert_eq!(p.stats.mean_distance, 0.0);
        assert_eq!(p.stats.spread, 0.0);
    }

    #[test]
    fn test_centroid_and_stats() {
        let batch = vec![snap("a", vec![0.0, 0.0], 1), snap("a", vec![2.0, 0.0], 2)];
        let p = &default_compressor().compress(&batch)[0];

        assert_eq!(p.centroid.data(), &[1.0, 0.0]);
        assert_eq!(p.stats.mean_distance, 1.0);
        assert_eq!(p.stats.min_distance, 1.0);
        assert_eq!(p.stats.max_distance, 1.0);
        assert_eq!(p.stats.std_distance, 0.0);
        assert_eq!(p.density, 0.0);
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let batch = vec![
            snap("b", vec![1.0], 1),
            snap("a", vec![1.0], 1),
            snap("b", vec![3.0], 2),
        ];
        let patterns = default_compressor().compress(&batch);
        let ids: Vec<&str> = patterns.iter().map(|p| p.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(patterns[0].snapshot_count, 2);
        assert_eq!(patterns[0].centroid.data(), &[2.0]);
    }

    #[test]
    fn test_dimensions_may_differ_across_entities() {
        let batch = vec![snap("a", vec![1.0], 1), snap("b", vec![1.0, 2.0, 3.0], 1)];
        let patterns = default_compressor().compress(&batch);
        assert_eq!(patterns[0].centroid.dimensions(), 1);
        assert_eq!(patterns[1].centroid.dimensions(), 3);
    }

    #[test]
    fn test_min_snapshots_skips_small_groups() {
        let config = CompressorConfig {
            min_snapshots: 2,
            ..Default::default()
        };
        let batch = vec![
            snap("a", vec![1.0], 1),
            snap("b", vec![1.0], 1),
            snap("b", vec![2.0], 2),
        ];
        let patterns = Compressor::new(config).unwrap().compress(&batch);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].entity_id, "b");
    }

    #[test]
    fn test_invalid_group_is_isolated() {
        let observer = Arc::new(RecordingObserver::default());
        let compressor = default_compressor().with_observer(observer.clone());
        let batch = vec![
            snap("bad", vec![1.0, 2.0], 1),
            snap("good", vec![1.0], 1),
            snap("bad", vec![1.0], 2),
            snap("nan", vec![f64::NAN], 1),
        ];

        let patterns = compressor.compress(&batch);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].entity_id, "good");

        let errors = observer.errors.lock();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            (
                "bad".to_string(),
                GridError::DimensionMismatch {
                    expected: 2,
                    got: 1
                }
            )
        );
        assert!(matches!(errors[1].1, GridError::NonFinite { .. }));
        assert_eq!(*observer.before.lock(), vec!["good".to_string()]);
        assert_eq!(*observer.after.lock(), vec!["good".to_string()]);
    }

    #[test]
    fn test_overflowing_group_is_omitted() {
        let observer = Arc::new(RecordingObserver::default());
        let compressor = default_compressor().with_observer(observer.clone());
        let batch = vec![
            snap("sum", vec![1e308], 1),
            snap("sum", vec![1e308], 2),
            snap("sum", vec![-1e308], 3),
            snap("spread", vec![1e308], 1),
            snap("spread", vec![-1e308], 2),
            snap("ok", vec![1.0], 1),
        ];

        let patterns = compressor.compress(&batch);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].entity_id, "ok");

        let errors = observer.errors.lock();
        assert_eq!(
            *errors,
            vec![
                ("sum".to_string(), GridError::Overflow("centroid")),
                ("spread".to_string(), GridError::Overflow("distance statistics")),
            ]
        );
    }

    #[test]
    fn test_empty_entity_id_is_rejected() {
        let observer = Arc::new(RecordingObserver::default());
        let compressor = default_compressor().with_observer(observer.clone());
        let patterns = compressor.compress(&[snap("", vec![1.0], 1), snap("ok", vec![1.0], 1)]);

        assert_eq!(patterns.len(), 1);
        assert_eq!(observer.errors.lock()[0].1, GridError::EmptyEntityId);
    }

    #[test]
    fn test_panicking_observer_does_not_break_compression() {
        let compressor = default_compressor().with_observer(Arc::new(PanickingObserver));
        let patterns = compressor.compress(&[snap("a", vec![1.0], 1)]);
        assert_eq!(patterns.len(), 1);
    }

    #[test]
    fn test_recency_weights() {
        assert_eq!(recency_weights(&[5, 10, 15], 0.0), vec![1.0, 1.0, 1.0]);
        assert_eq!(recency_weights(&[5, 10, 15], -1.0), vec![1.0, 1.0, 1.0]);
        assert_eq!(recency_weights(&[0, 5, 10], 2.0), vec![1.0, 2.0, 3.0]);
        // span floor of 1
        assert_eq!(recency_weights(&[7, 7], 1.0), vec![1.0, 1.0]);
        assert!(recency_weights(&[], 1.0).is_empty());
    }

    #[test]
    fn test_recency_weights_span_full_timestamp_range() {
        assert_eq!(
            recency_weights(&[i64::MIN, 0, i64::MAX], 1.0),
            vec![1.0, 1.5, 2.0]
        );

        let config = CompressorConfig {
            recency_weight: 1.0,
            ..Default::default()
        };
        let batch = vec![snap("a", vec![3.0], i64::MAX), snap("a", vec![0.0], i64::MIN)];
        let p = &Compressor::new(config).unwrap().compress(&batch)[0];
        // weights 1 and 2 → (0 + 6) / 3
        assert!((p.centroid[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_recency_weighting_pulls_toward_newest() {
        let config = CompressorConfig {
            recency_weight: 2.0,
            ..Default::default()
        };
        // Inserted out of order; sorted by timestamp before weighting.
        let batch = vec![snap("a", vec![10.0], 10), snap("a", vec![0.0], 0)];
        let p = &Compressor::new(config).unwrap().compress(&batch)[0];

        // weights 1 (t=0) and 3 (t=10) → (0 + 30) / 4
        assert!((p.centroid[0] - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_l2_normalize() {
        let config = CompressorConfig {
            l2_normalize: true,
            ..Default::default()
        };
        let batch = vec![
            snap("a", vec![3.0, 0.0], 1),
            snap("a", vec![10.0, 0.0], 2),
            snap("z", vec![0.0, 0.0], 1),
        ];
        let patterns = Compressor::new(config).unwrap().compress(&batch);

        assert_eq!(patterns[0].centroid.data(), &[1.0, 0.0]);
        assert_eq!(patterns[0].density, 1.0);
        assert_eq!(patterns[1].centroid.data(), &[0.0, 0.0]);
    }

    #[test]
    fn test_trim_mask_band() {
        let distances = [0.0, 1.0, 2.0, 3.0, 100.0];
        // q(0.1) = 0.4, q(0.75) = 3.0
        let mask = trim_mask(&distances, Some((0.1, 0.75)));
        assert_eq!(mask, vec![false, true, true, true, false]);
        assert_eq!(trim_mask(&distances, None), vec![true; 5]);
    }

    #[test]
    fn test_trimming_removes_outlier_from_centroid() {
        let config = CompressorConfig {
            trim_upper_quantile: Some(0.8),
            ..Default::default()
        };
        let batch = vec![
            snap("a", vec![0.0], 1),
            snap("a", vec![0.0], 2),
            snap("a", vec![0.0], 3),
            snap("a", vec![0.0], 4),
            snap("a", vec![100.0], 5),
        ];
        let p = &Compressor::new(config).unwrap().compress(&batch)[0];

        assert_eq!(p.centroid.data(), &[0.0]);
        // Full set measured against the trimmed centroid.
        assert_eq!(p.snapshot_count, 5);
        assert_eq!(p.stats.max_distance, 100.0);
        assert!((p.stats.mean_distance - 20.0).abs() < 1e-12);
        assert_eq!(p.density, 0.0);
    }

    #[test]
    fn test_empty_kept_set_falls_back_to_full_centroid() {
        let config = CompressorConfig {
            recency_weight: 1.0,
            trim_lower_quantile: Some(0.2),
            trim_upper_quantile: Some(0.8),
            ..Default::default()
        };
        // weights 1 and 2 → centroid 20/3, distances 20/3 and 10/3.
        // The band [4, 6] contains neither distance.
        let batch = vec![snap("a", vec![0.0], 0), snap("a", vec![10.0], 10)];
        let p = &Compressor::new(config).unwrap().compress(&batch)[0];
        assert!((p.centroid[0] - 20.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_quantiles_rejected() {
        for (low, high) in [
            (Some(0.6), Some(0.4)),
            (Some(0.5), Some(0.5)),
            (Some(-0.1), None),
            (None, Some(1.5)),
            (Some(1.0), None),
            (None, Some(0.0)),
            (Some(f64::NAN), Some(0.9)),
        ] {
            let config = CompressorConfig {
                trim_lower_quantile: low,
                trim_upper_quantile: high,
                ..Default::default()
            };
            assert!(
                matches!(
                    Compressor::new(config),
                    Err(GridError::InvalidQuantiles { .. })
                ),
                "expected rejection for ({low:?}, {high:?})"
            );
        }
    }

    #[test]
    fn test_non_finite_recency_weight_rejected() {
        let config = CompressorConfig {
            recency_weight: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            Compressor::new(config),
            Err(GridError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_custom_distance() {
        let batch = vec![snap("a", vec![0.0, 0.0], 1), snap("a", vec![2.0, 2.0], 2)];
        let compressor = default_compressor().with_distance(Distance::manhattan);
        let p = &compressor.compress(&batch)[0];
        // centroid (1, 1), manhattan distance 2 each
        assert_eq!(p.stats.mean_distance, 2.0);

        let p = &default_compressor()
            .with_metric(Metric::Chebyshev)
            .compress(&batch)[0];
        assert_eq!(p.stats.mean_distance, 1.0);
    }

    #[test]
    fn test_deterministic_regardless_of_insertion_order() {
        let config = CompressorConfig {
            recency_weight: 0.5,
            trim_lower_quantile: Some(0.05),
            trim_upper_quantile: Some(0.95),
            ..Default::default()
        };
        let compressor = Compressor::new(config).unwrap();
        let mut batch: Vec<Snapshot> = (0..20)
            .map(|i| snap("a", vec![(i as f64).sin(), (i as f64 * 0.3).cos()], i))
            .collect();

        let forward = compressor.compress(&batch);
        batch.reverse();
        let reversed = compressor.compress(&batch);
        assert_eq!(forward, reversed);
        assert_eq!(forward, compressor.compress(&batch));
    }

    #[test]
    fn test_pattern_serializes_camel_case() {
        let p = &default_compressor().compress(&[snap("a", vec![1.0], 1)])[0];
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["entityId"], "a");
        assert_eq!(json["snapshotCount"], 1);
        assert_eq!(json["centroid"], serde_json::json!([1.0]));
        assert!(json["stats"]["radiusP90"].is_number());
        assert!(json["stats"]["meanDistance"].is_number());
    }

    #[test]
    fn test_config_from_json() {
        let config: CompressorConfig = serde_json::from_str(
            r#"{"minSnapshots": 3, "trimUpperQuantile": 0.9, "metric": "manhattan"}"#,
        )
        .unwrap();
        assert_eq!(config.min_snapshots, 3);
        assert_eq!(config.trim_upper_quantile, Some(0.9));
        assert_eq!(config.metric, Metric::Manhattan);
        assert!(!config.l2_normalize);
        assert!(Compressor::new(config).is_ok());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let batch: Vec<Snapshot> = (0..200)
            .map(|i| snap(&format!("e{}", i % 7), vec![i as f64, (i * i) as f64], i))
            .collect();
        let compressor = default_compressor();
        assert_eq!(compressor.compress(&batch), compressor.compress_par(&batch));
    }
}
