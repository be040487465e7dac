//! Stability fingerprints: velocity-based volatility plus step symmetry,
//! collapsed into a trust rating.
//!
//! For samples `v[0..n]` with `dt[i]` seconds elapsed before sample `i`:
//!
//! - `volatility_index = mean(|v[i] - v[i-1]| / dt[i])` over consecutive pairs
//! - `symmetry_score = 1 - Σ|v[i][j] - v[i-1][j]| / (pairs * dim)`
//!
//! Both are 0 with fewer than two samples.

use crate::distance::Distance;
use crate::error::{GridError, Result};
use crate::vector::Vector;
use serde::{Deserialize, Serialize};

/// Coarse trust classification of a fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustRating {
    High,
    Medium,
    Low,
}

/// Classification thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StabilityConfig {
    pub high_max_volatility: f64,
    pub high_min_symmetry: f64,
    pub medium_max_volatility: f64,
    pub medium_min_symmetry: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            high_max_volatility: 0.1,
            high_min_symmetry: 0.9,
            medium_max_volatility: 0.3,
            medium_min_symmetry: 0.7,
        }
    }
}

impl StabilityConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("high_max_volatility", self.high_max_volatility),
            ("high_min_symmetry", self.high_min_symmetry),
            ("medium_max_volatility", self.medium_max_volatility),
            ("medium_min_symmetry", self.medium_min_symmetry),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(GridError::InvalidParameter {
                    name,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// `High` if volatility and symmetry pass the high bars, `Medium` if they
    /// pass the medium bars, else `Low`. Bounds are strict.
    pub fn classify(&self, volatility: f64, symmetry: f64) -> TrustRating {
        if volatility < self.high_max_volatility && symmetry > self.high_min_symmetry {
            TrustRating::High
        } else if volatility < self.medium_max_volatility && symmetry > self.medium_min_symmetry {
            TrustRating::Medium
        } else {
            TrustRating::Low
        }
    }
}

/// A vector plus the seconds elapsed since the previous sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilitySample {
    pub vector: Vector,
    /// Ignored for the first sample of a sequence.
    pub time_delta_sec: f64,
}

impl StabilitySample {
    pub fn new(vector: impl Into<Vector>, time_delta_sec: f64) -> Self {
        Self {
            vector: vector.into(),
            time_delta_sec,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StabilityFingerprint {
    pub entity_id: String,
    pub volatility_index: f64,
    pub symmetry_score: f64,
    pub trust_rating: TrustRating,
}

/// Evaluates stability fingerprints.
#[derive(Clone, Debug, Default)]
pub struct StabilityEvaluator {
    config: StabilityConfig,
}

impl StabilityEvaluator {
    pub fn new(config: StabilityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Fingerprint an ordered sample sequence for `entity_id`.
    ///
    /// Fails on an empty or non-finite vector, a dimension mismatch, a
    /// non-positive or non-finite time delta after the first sample, or a
    /// score that overflows.
    pub fn evaluate(
        &self,
        entity_id: &str,
        samples: &[StabilitySample],
    ) -> Result<StabilityFingerprint> {
        let volatility = volatility_index(samples)?;
        let symmetry = symmetry_score(samples)?;

        Ok(StabilityFingerprint {
            entity_id: entity_id.to_string(),
            volatility_index: volatility,
            symmetry_score: symmetry,
            trust_rating: self.config.classify(volatility, symmetry),
        })
    }
}

/// Mean rate of change per second across consecutive pairs.
pub fn volatility_index(samples: &[StabilitySample]) -> Result<f64> {
    validate_samples(samples)?;
    if samples.len() < 2 {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for (i, pair) in samples.windows(2).enumerate() {
        let dt = pair[1].time_delta_sec;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(GridError::InvalidTimeDelta {
                index: i + 1,
                value: dt,
            });
        }
        total += Distance::checked_euclidean(pair[0].vector.data(), pair[1].vector.data())? / dt;
    }
    let volatility = total / (samples.len() - 1) as f64;
    if !volatility.is_finite() {
        return Err(GridError::Overflow("volatility_index"));
    }
    Ok(volatility)
}

/// One minus the mean per-dimension absolute step.
pub fn symmetry_score(samples: &[StabilitySample]) -> Result<f64> {
    validate_samples(samples)?;
    let Some(first) = samples.first() else {
        return Ok(0.0);
    };
    if samples.len() < 2 {
        return Ok(0.0);
    }

    let dim = first.vector.dimensions();
    let mut total = 0.0;
    for pair in samples.windows(2) {
        pair[1].vector.ensure_dimensions(dim)?;
        total += Distance::manhattan(pair[0].vector.data(), pair[1].vector.data());
    }
    let pairs = (samples.len() - 1) as f64;
    let symmetry = 1.0 - total / (pairs * dim as f64);
    if !symmetry.is_finite() {
        return Err(GridError::Overflow("symmetry_score"));
    }
    Ok(symmetry)
}

/// Every sample vector must be non-empty and finite.
fn validate_samples(samples: &[StabilitySample]) -> Result<()> {
    samples.iter().try_for_each(|s| s.vector.validate())
}
