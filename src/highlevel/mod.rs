//! High-level convenience API.
//!
//! This layer provides [`Grid`], an ergonomic wrapper that owns a shared
//! [`VectorStore`](crate::memory::VectorStore) handle, a
//! [`PatternMemory`](crate::memory::PatternMemory) and the three analysers,
//! and runs them over the store's per-entity windows.
//!
//! For production or library code that already has its batches in hand,
//! prefer the analysers directly.

pub mod client;

pub use client::{EntityReport, Grid, GridConfig};
