//! Convenience wrapper that owns a store handle, a [`PatternMemory`] and
//! the three analysers, wiring the store's windows into each of them.
//!
//! For full control, use [`memory`](crate::memory), [`Compressor`],
//! [`AnomalyEngine`] and [`StabilityEvaluator`] directly.

use crate::anomaly::{AnomalyConfig, AnomalyEngine, InferenceResult};
use crate::compressor::{CompressedPattern, Compressor, CompressorConfig};
use crate::error::{GridError, Result};
use crate::memory::{PatternMemory, Snapshot, VectorStore};
use crate::stability::{
    StabilityConfig, StabilityEvaluator, StabilityFingerprint, StabilitySample,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

const MS_PER_SEC: f64 = 1_000.0;

/// Settings for every analyser owned by a [`Grid`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub compressor: CompressorConfig,
    pub anomaly: AnomalyConfig,
    pub stability: StabilityConfig,
}

/// Every per-entity signal computed over one window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReport {
    pub entity_id: String,
    /// `None` when the window is empty
    pub pattern: Option<CompressedPattern>,
    pub inference: InferenceResult,
    pub trend_shift: f64,
    /// `None` when two snapshots in the window share a timestamp
    pub stability: Option<StabilityFingerprint>,
}

/// Convenience wrapper over the memory layer and the analysers.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use thinkgrid::highlevel::Grid;
/// use thinkgrid::memory::{ManualClock, Snapshot, VectorStore};
///
/// let store = Arc::new(VectorStore::with_clock(Arc::new(ManualClock::new(10_000))));
/// let grid = Grid::new(store);
///
/// for i in 0..5 {
///     grid.record(Snapshot::new("alpha", vec![0.5, 0.5], i * 1_000, "feed"))?;
/// }
///
/// let report = grid.report("alpha", 5)?;
/// assert_eq!(report.pattern.unwrap().density, 1.0);
/// assert!(!report.inference.is_anomalous);
/// # Ok::<(), thinkgrid::GridError>(())
/// ```
pub struct Grid {
    store: Arc<VectorStore>,
    patterns: PatternMemory,
    compressor: Compressor,
    engine: AnomalyEngine,
    evaluator: StabilityEvaluator,
}

impl Grid {
    /// Create a grid over `store` with default analysers.
    pub fn new(store: Arc<VectorStore>) -> Self {
        Self::with_analysers(
            store,
            Compressor::default(),
            AnomalyEngine::default(),
            StabilityEvaluator::default(),
        )
    }

    /// Create a grid over `store`, validating `config`.
    pub fn with_config(store: Arc<VectorStore>, config: GridConfig) -> Result<Self> {
        Ok(Self::with_analysers(
            store,
            Compressor::new(config.compressor)?,
            AnomalyEngine::new(config.anomaly)?,
            StabilityEvaluator::new(config.stability)?,
        ))
    }

    /// Create a grid from pre-built analysers (custom distances, observers).
    pub fn with_analysers(
        store: Arc<VectorStore>,
        compressor: Compressor,
        engine: AnomalyEngine,
        evaluator: StabilityEvaluator,
    ) -> Self {
        Self {
            patterns: PatternMemory::new(Arc::clone(&store)),
            store,
            compressor,
            engine,
            evaluator,
        }
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    pub fn patterns(&self) -> &PatternMemory {
        &self.patterns
    }

    /// Record a snapshot.
    pub fn record(&self, snapshot: Snapshot) -> Result<()> {
        self.store.insert(snapshot)
    }

    /// Evict snapshots older than `max_age_ms`; returns how many were removed.
    pub fn sweep(&self, max_age_ms: i64) -> usize {
        self.store.remove_older_than(max_age_ms)
    }

    /// Compress everything currently in the store.
    pub fn compress(&self) -> Vec<CompressedPattern> {
        self.compressor.compress(&self.store.snapshots())
    }

    /// Compress one entity's snapshots from the last `window_ms`.
    pub fn compress_recent(&self, entity_id: &str, window_ms: i64) -> Option<CompressedPattern> {
        let recent = self.store.query_recent(entity_id, window_ms);
        if recent.is_empty() {
            return None;
        }
        self.compressor.compress_entity(entity_id, &recent)
    }

    /// Score the entity's `count` most recent snapshots, oldest first.
    pub fn infer(&self, entity_id: &str, count: usize) -> InferenceResult {
        self.infer_window(entity_id, &self.chronological_window(entity_id, count))
    }

    pub fn trend_shift(&self, entity_id: &str) -> Result<f64> {
        self.patterns.compute_trend_shift(entity_id)
    }

    /// Fingerprint the entity's `count` most recent snapshots.
    ///
    /// Time deltas come from consecutive millisecond timestamps.
    pub fn stability(&self, entity_id: &str, count: usize) -> Result<StabilityFingerprint> {
        self.stability_window(entity_id, &self.chronological_window(entity_id, count))
    }

    /// All signals for one entity over its `count` most recent snapshots.
    ///
    /// A window whose timestamps repeat has no stability fingerprint; the
    /// other signals are still reported.
    pub fn report(&self, entity_id: &str, count: usize) -> Result<EntityReport> {
        let window = self.chronological_window(entity_id, count);
        let pattern = if window.is_empty() {
            None
        } else {
            self.compressor.compress_entity(entity_id, &window)
        };

        Ok(EntityReport {
            entity_id: entity_id.to_string(),
            pattern,
            inference: self.infer_window(entity_id, &window),
            trend_shift: self.trend_shift(entity_id)?,
            stability: match self.stability_window(entity_id, &window) {
                Ok(fingerprint) => Some(fingerprint),
                Err(GridError::InvalidTimeDelta { index, value }) => {
                    debug!(entity_id, index, value, "window timestamps repeat; no stability");
                    None
                }
                Err(error) => return Err(error),
            },
        })
    }

    fn chronological_window(&self, entity_id: &str, count: usize) -> Vec<Snapshot> {
        let mut window = self.store.get_window(entity_id, count);
        window.reverse();
        window
    }

    fn infer_window(&self, entity_id: &str, window: &[Snapshot]) -> InferenceResult {
        if window.is_empty() {
            return InferenceResult::neutral(entity_id);
        }
        self.engine.infer(window)
    }

    fn stability_window(
        &self,
        entity_id: &str,
        window: &[Snapshot],
    ) -> Result<StabilityFingerprint> {
        let mut prev_ts: Option<i64> = None;
        let samples: Vec<StabilitySample> = window
            .iter()
            .map(|s| {
                let dt = prev_ts.map_or(0.0, |p| {
                    (i128::from(s.timestamp) - i128::from(p)) as f64 / MS_PER_SEC
                });
                prev_ts = Some(s.timestamp);
                StabilitySample::new(s.vector.clone(), dt)
            })
            .collect();
        self.evaluator.evaluate(entity_id, &samples)
    }
}
