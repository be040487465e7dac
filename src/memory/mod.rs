//! Memory layer: the rolling snapshot store and pattern memory.
//!
//! This module provides:
//!
//! - [`VectorStore`]: a shared, lock-protected collection of timestamped
//!   [`Snapshot`]s with recency queries, eviction sweeps and per-entity
//!   mean vectors.
//!
//! - [`PatternMemory`]: a handle over a store that measures whether an
//!   entity's movement is speeding up or slowing down (trend shift).
//!
//! Stores are owned by the caller and passed around as `Arc<VectorStore>`;
//! there is no process-wide instance.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use thinkgrid::memory::{ManualClock, PatternMemory, Snapshot, VectorStore};
//!
//! let store = Arc::new(VectorStore::with_clock(Arc::new(ManualClock::new(0))));
//! let memory = PatternMemory::new(store.clone());
//!
//! memory.add(Snapshot::new("alpha", vec![0.0, 0.0], 1, "feed"))?;
//! memory.add(Snapshot::new("alpha", vec![1.0, 0.0], 2, "feed"))?;
//! memory.add(Snapshot::new("alpha", vec![3.0, 0.0], 3, "feed"))?;
//!
//! assert_eq!(memory.compute_trend_shift("alpha")?, 1.0);
//! assert_eq!(store.len(), 3);
//! # Ok::<(), thinkgrid::GridError>(())
//! ```

pub mod pattern;
pub mod store;

pub use pattern::{PatternMemory, DEFAULT_RECENT_COUNT};
pub use store::{Clock, ManualClock, Snapshot, SystemClock, VectorStore};
