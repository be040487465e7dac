//! Pattern memory: recency queries plus trend-shift over the latest snapshots.

use super::store::{Snapshot, VectorStore};
use crate::distance::Distance;
use crate::error::Result;
use std::sync::Arc;

/// Default number of snapshots returned by [`PatternMemory::get_recent`].
pub const DEFAULT_RECENT_COUNT: usize = 5;

/// Snapshots that enter a trend-shift computation.
const TREND_WINDOW: usize = 3;

/// A view over a shared [`VectorStore`] that tracks how an entity's
/// movement is changing.
#[derive(Clone)]
pub struct PatternMemory {
    store: Arc<VectorStore>,
}

impl PatternMemory {
    pub fn new(store: Arc<VectorStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    /// Record a snapshot in the underlying store.
    pub fn add(&self, snapshot: Snapshot) -> Result<()> {
        self.store.insert(snapshot)
    }

    /// The `count` most recent snapshots of `entity_id`, newest first.
    pub fn get_recent(&self, entity_id: &str, count: usize) -> Vec<Snapshot> {
        self.store.get_window(entity_id, count)
    }

    /// Second difference of movement over the three newest snapshots.
    ///
    /// With `a, b, c` ordered oldest to newest, returns
    /// `dist(b, c) - dist(a, b)`: positive when change is accelerating,
    /// negative when it is slowing down. Fewer than three snapshots yield `0.0`.
    pub fn compute_trend_shift(&self, entity_id: &str) -> Result<f64> {
        let recent = self.get_recent(entity_id, TREND_WINDOW);
        let [c, b, a] = recent.as_slice() else {
            return Ok(0.0);
        };

        let earlier = Distance::checked_euclidean(a.vector.data(), b.vector.data())?;
        let later = Distance::checked_euclidean(b.vector.data(), c.vector.data())?;
        Ok(later - earlier)
    }
}
