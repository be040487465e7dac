//! Instrumentation hooks.
//!
//! Observers are notified at fixed points of a computation and cannot change
//! its outcome. A panicking observer is caught and logged; the computation
//! carries on as if the hook had returned normally.

use crate::anomaly::InferenceResult;
use crate::compressor::CompressedPattern;
use crate::error::GridError;
use crate::memory::Snapshot;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::warn;

/// Hooks around per-entity compression. All methods default to no-ops.
pub trait CompressionObserver: Send + Sync {
    /// Called before an entity's group is processed.
    fn on_before(&self, _entity_id: &str, _snapshots: &[Snapshot]) {}

    /// Called after a pattern has been produced.
    fn on_after(&self, _pattern: &CompressedPattern) {}

    /// Called when a group fails and is omitted from the output.
    fn on_error(&self, _entity_id: &str, _error: &GridError) {}
}

/// Hooks around anomaly inference. All methods default to no-ops.
pub trait InferenceObserver: Send + Sync {
    fn on_before(&self, _entity_id: &str, _snapshots: &[Snapshot]) {}

    fn on_after(&self, _result: &InferenceResult) {}

    fn on_error(&self, _entity_id: &str, _error: &GridError) {}
}

/// Run an observer callback, swallowing any panic it raises.
pub(crate) fn notify<F: FnOnce()>(hook: &'static str, f: F) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!(hook, "observer panicked; ignoring");
    }
}
