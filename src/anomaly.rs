//! Anomaly inference over one entity's chronological snapshots.
//!
//! Movement between consecutive snapshots is measured with Euclidean
//! distance. The population standard deviation of those movements is the
//! *instability score*: steady movement (even fast movement) scores 0, while
//! erratic bursts score high.
//!
//! - `is_anomalous = instability > anomaly_threshold`
//! - `coherence = clamp01(1 - instability / anomaly_threshold)`
//!
//! With `anomaly_threshold = 1` coherence reduces to `max(0, 1 - instability)`.
//!
//! The engine treats slice order as time order; sort before calling.
//!
//! # Example
//!
//! ```rust
//! use thinkgrid::anomaly::{AnomalyConfig, AnomalyEngine};
//! use thinkgrid::memory::Snapshot;
//!
//! let engine = AnomalyEngine::new(AnomalyConfig::default())?;
//! let steady: Vec<Snapshot> = (0..4)
//!     .map(|i| Snapshot::new("alpha", vec![i as f64, 0.0], i, "feed"))
//!     .collect();
//!
//! let result = engine.infer(&steady);
//! assert_eq!(result.instability_score, 0.0);
//! assert_eq!(result.coherence, 1.0);
//! assert!(!result.is_anomalous);
//! # Ok::<(), thinkgrid::GridError>(())
//! ```

use crate::distance::Distance;
use crate::error::{GridError, Result};
use crate::memory::Snapshot;
use crate::observer::{notify, InferenceObserver};
use crate::stats::{clamp01, mean_std};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Entity id reported when the input carries none.
pub const UNKNOWN_ENTITY: &str = "unknown";

/// Anomaly engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnomalyConfig {
    /// Fewer snapshots than this yield the neutral result
    pub min_snapshots: usize,
    /// Instability above this is anomalous; also the coherence scale
    pub anomaly_threshold: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_snapshots: 2,
            anomaly_threshold: 0.6,
        }
    }
}

impl AnomalyConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold <= 0.0 {
            return Err(GridError::InvalidParameter {
                name: "anomaly_threshold",
                reason: format!("must be finite and > 0, got {}", self.anomaly_threshold),
            });
        }
        Ok(())
    }
}

/// Coherence and instability of one entity's movement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    pub entity_id: String,
    /// `[0, 1]`, higher = more stable
    pub coherence: f64,
    /// Standard deviation of consecutive movements, `>= 0`
    pub instability_score: f64,
    pub is_anomalous: bool,
}

impl InferenceResult {
    /// The degraded-but-valid result for inputs that cannot be scored.
    pub fn neutral(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            coherence: 0.0,
            instability_score: 0.0,
            is_anomalous: false,
        }
    }
}

/// Derives coherence/instability signals from snapshot sequences.
#[derive(Clone)]
pub struct AnomalyEngine {
    config: AnomalyConfig,
    observer: Option<Arc<dyn InferenceObserver>>,
}

impl AnomalyEngine {
    pub fn new(config: AnomalyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observer: None,
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn InferenceObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Score `snapshots`, never failing.
    ///
    /// Too few snapshots give [`InferenceResult::neutral`]. A dimension
    /// mismatch, a non-finite component or an overflowing movement is
    /// reported to the observer and also yields the neutral result.
    pub fn infer(&self, snapshots: &[Snapshot]) -> InferenceResult {
        let entity_id = entity_of(snapshots);
        match self.try_infer(snapshots) {
            Ok(result) => result,
            Err(error) => {
                warn!(entity_id, %error, "inference failed; returning neutral result");
                if let Some(obs) = &self.observer {
                    notify("on_error", || obs.on_error(entity_id, &error));
                }
                InferenceResult::neutral(entity_id)
            }
        }
    }

    /// Score `snapshots`, surfacing validation errors.
    ///
    /// Insufficient data is still answered with the neutral result.
    pub fn try_infer(&self, snapshots: &[Snapshot]) -> Result<InferenceResult> {
        let entity_id = entity_of(snapshots);
        if let Some(obs) = &self.observer {
            notify("on_before", || obs.on_before(entity_id, snapshots));
        }

        let result = match self.instability(snapshots) {
            Ok(instability) => {
                let threshold = self.config.anomaly_threshold;
                InferenceResult {
                    entity_id: entity_id.to_string(),
                    coherence: clamp01(1.0 - instability / threshold),
                    instability_score: instability,
                    is_anomalous: instability > threshold,
                }
            }
            Err(GridError::InsufficientData { required, got }) => {
                warn!(entity_id, required, got, "not enough snapshots; returning neutral result");
                InferenceResult::neutral(entity_id)
            }
            Err(error) => return Err(error),
        };

        debug!(
            entity_id,
            coherence = result.coherence,
            instability = result.instability_score,
            anomalous = result.is_anomalous,
            "inference result"
        );
        if let Some(obs) = &self.observer {
            notify("on_after", || obs.on_after(&result));
        }
        Ok(result)
    }

    /// Standard deviation of consecutive Euclidean movements.
    fn instability(&self, snapshots: &[Snapshot]) -> Result<f64> {
        let required = self.config.min_snapshots.max(2);
        if snapshots.len() < required {
            return Err(GridError::InsufficientData {
                required,
                got: snapshots.len(),
            });
        }
        for snap in snapshots {
            snap.vector.validate()?;
        }

        let deltas = snapshots
            .windows(2)
            .map(|pair| Distance::checked_euclidean(pair[0].vector.data(), pair[1].vector.data()))
            .collect::<Result<Vec<f64>>>()?;
        let (_, std) = mean_std(&deltas);
        if !std.is_finite() {
            return Err(GridError::Overflow("instability"));
        }
        Ok(std)
    }
}

impl Default for AnomalyEngine {
    fn default() -> Self {
        Self {
            config: AnomalyConfig::default(),
            observer: None,
        }
    }
}

fn entity_of(snapshots: &[Snapshot]) -> &str {
    snapshots
        .first()
        .map(|s| s.entity_id.as_str())
        .filter(|id| !id.is_empty())
        .unwrap_or(UNKNOWN_ENTITY)
}
