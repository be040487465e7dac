//! # ThinkGrid: Behavioural Pattern Memory
//!
//! ThinkGrid keeps time-stamped feature vectors per entity and derives
//! compact behavioural signals from them: compressed centroid patterns,
//! trend shifts, anomaly inference and stability fingerprints.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use thinkgrid::{Compressor, CompressorConfig, Snapshot, VectorStore};
//!
//! let store = Arc::new(VectorStore::new());
//! store.insert(Snapshot::new("alpha", vec![0.2, 0.4], 1_000, "feed"))?;
//! store.insert(Snapshot::new("alpha", vec![0.4, 0.4], 2_000, "feed"))?;
//! store.insert(Snapshot::new("beta", vec![0.9, 0.1], 1_500, "feed"))?;
//!
//! let compressor = Compressor::new(CompressorConfig::default())?;
//! let patterns = compressor.compress(&store.snapshots());
//!
//! assert_eq!(patterns.len(), 2);
//! assert_eq!(patterns[0].entity_id, "alpha");
//! assert!((patterns[0].centroid[0] - 0.3).abs() < 1e-12);
//! # Ok::<(), thinkgrid::GridError>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Snapshot**: one entity's feature vector at a millisecond timestamp
//! - **Compression**: collapse a group of snapshots into a centroid, a density and spread statistics
//! - **Trend shift**: whether the latest movement is larger than the one before
//! - **Inference**: coherence and instability from the variability of movement
//! - **Stability**: velocity-based volatility and step symmetry, rated High/Medium/Low

pub mod accumulator;
pub mod anomaly;
pub mod compressor;
pub mod distance;
pub mod error;
pub mod highlevel;
pub mod memory;
pub mod observer;
pub mod preprocess;
pub mod stability;
pub mod stats;
pub mod vector;

// Re-exports for convenience
pub use accumulator::Accumulator;
pub use anomaly::{AnomalyConfig, AnomalyEngine, InferenceResult};
pub use compressor::{CompressedPattern, Compressor, CompressorConfig};
pub use distance::{Distance, DistanceFn, Metric};
pub use error::{ErrorKind, GridError, Result};
pub use highlevel::{EntityReport, Grid, GridConfig};
pub use memory::{Clock, ManualClock, PatternMemory, Snapshot, SystemClock, VectorStore};
pub use observer::{CompressionObserver, InferenceObserver};
pub use preprocess::{normalize_features, FeatureRecord};
pub use stability::{
    StabilityConfig, StabilityEvaluator, StabilityFingerprint, StabilitySample, TrustRating,
};
pub use stats::DistanceStats;
pub use vector::Vector;
