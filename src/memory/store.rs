//! Time-windowed, per-entity vector store.
//!
//! All timestamps handled by the store are **milliseconds since the Unix
//! epoch**. "Now" comes from the store's [`Clock`], so recency queries and
//! eviction sweeps are reproducible under a [`ManualClock`].
//!
//! The store is shared state: producers insert while consumers query and
//! sweep. Snapshots live behind a `parking_lot::RwLock` and every query
//! returns owned copies, so readers never observe a partially-applied write.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use thinkgrid::memory::{ManualClock, Snapshot, VectorStore};
//!
//! let clock = Arc::new(ManualClock::new(10_000));
//! let store = VectorStore::with_clock(clock.clone());
//!
//! store.insert(Snapshot::new("alpha", vec![1.0, 0.0], 9_000, "feed"))?;
//! store.insert(Snapshot::new("alpha", vec![3.0, 2.0], 9_500, "feed"))?;
//!
//! assert_eq!(store.query_recent("alpha", 600).len(), 1);
//! let mean = store.compute_aggregate("alpha")?.unwrap();
//! assert_eq!(mean.data(), &[2.0, 1.0]);
//! # Ok::<(), thinkgrid::GridError>(())
//! ```

use crate::accumulator::Accumulator;
use crate::error::{GridError, Result};
use crate::vector::Vector;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// One timestamped observation of an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub entity_id: String,
    pub vector: Vector,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Free-form label or source tag.
    pub label: String,
}

impl Snapshot {
    pub fn new(
        entity_id: impl Into<String>,
        vector: impl Into<Vector>,
        timestamp: i64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            vector: vector.into(),
            timestamp,
            label: label.into(),
        }
    }

    /// Check the entity id is non-empty and the vector is non-empty and finite.
    pub fn validate(&self) -> Result<()> {
        if self.entity_id.is_empty() {
            return Err(GridError::EmptyEntityId);
        }
        self.vector.validate()
    }
}

/// Source of the current time, in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Age of `timestamp` at `now`, exact for any pair of `i64` values.
fn age_ms(now: i64, timestamp: i64) -> i128 {
    i128::from(now) - i128::from(timestamp)
}

/// In-memory store of snapshots across all entities.
pub struct VectorStore {
    snapshots: RwLock<Vec<Snapshot>>,
    clock: Arc<dyn Clock>,
}

impl VectorStore {
    /// Create an empty store driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            clock,
        }
    }

    /// Current time according to the store's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Append a snapshot. Duplicates are kept.
    pub fn insert(&self, snapshot: Snapshot) -> Result<()> {
        snapshot.validate()?;
        self.snapshots.write().push(snapshot);
        Ok(())
    }

    /// All snapshots of `entity_id` no older than `window_ms`, in insertion order.
    pub fn query_recent(&self, entity_id: &str, window_ms: i64) -> Vec<Snapshot> {
        let now = self.now_ms();
        self.snapshots
            .read()
            .iter()
            .filter(|s| {
                s.entity_id == entity_id && age_ms(now, s.timestamp) <= i128::from(window_ms)
            })
            .cloned()
            .collect()
    }

    /// The `count` most recent snapshots of `entity_id`, newest first.
    ///
    /// Snapshots sharing a timestamp keep their insertion order.
    pub fn get_window(&self, entity_id: &str, count: usize) -> Vec<Snapshot> {
        let mut matching = self.snapshots_for(entity_id);
        matching.sort_by_key(|s| Reverse(s.timestamp));
        matching.truncate(count);
        matching
    }

    /// Evict every snapshot older than `max_age_ms`. Returns how many were removed.
    pub fn remove_older_than(&self, max_age_ms: i64) -> usize {
        let now = self.now_ms();
        let mut snapshots = self.snapshots.write();
        let before = snapshots.len();
        snapshots.retain(|s| age_ms(now, s.timestamp) <= i128::from(max_age_ms));
        let evicted = before - snapshots.len();
        debug!(now, max_age_ms, evicted, "swept vector store");
        evicted
    }

    /// Unweighted mean of every stored vector for `entity_id`.
    ///
    /// `Ok(None)` when the entity has no snapshots.
    pub fn compute_aggregate(&self, entity_id: &str) -> Result<Option<Vector>> {
        let snapshots = self.snapshots.read();
        let mut vectors = snapshots
            .iter()
            .filter(|s| s.entity_id == entity_id)
            .map(|s| s.vector.data());

        let Some(first) = vectors.next() else {
            return Ok(None);
        };
        let mut acc = Accumulator::new(first.len());
        acc.add(first)?;
        for v in vectors {
            acc.add(v)?;
        }
        Ok(acc.mean())
    }

    /// Every snapshot of `entity_id`, in insertion order.
    pub fn snapshots_for(&self, entity_id: &str) -> Vec<Snapshot> {
        self.snapshots
            .read()
            .iter()
            .filter(|s| s.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Copy of the whole store, in insertion order.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.read().clone()
    }

    /// Distinct entity ids in order of first insertion.
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for s in self.snapshots.read().iter() {
            if !ids.contains(&s.entity_id) {
                ids.push(s.entity_id.clone());
            }
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }

    pub fn clear(&self) {
        self.snapshots.write().clear();
    }
}

impl Default for VectorStore {
    fn default() -> Self {
        Self::new()
    }
}
