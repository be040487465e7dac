//! Turn raw named-feature records into comparable vectors.
//!
//! Each feature is min–max scaled across the batch into `[0, 1]`; a feature
//! that never varies maps to `0.5`. Vector layout follows the sorted feature
//! names of the first record.

use crate::error::{GridError, Result};
use crate::memory::Snapshot;
use crate::vector::Vector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One raw observation: named numeric features at a point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    pub entity_id: String,
    pub features: BTreeMap<String, f64>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default)]
    pub source: String,
}

/// Min–max normalize `records` into snapshots, one per record, in input order.
///
/// An empty batch, or a first record without features, yields no snapshots.
pub fn normalize_features(records: &[FeatureRecord]) -> Result<Vec<Snapshot>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let keys: Vec<&str> = first.features.keys().map(String::as_str).collect();
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    // rows[i][k] = value of feature k in record i
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(records.len());
    for record in records {
        let row = keys
            .iter()
            .map(|&key| {
                record
                    .features
                    .get(key)
                    .copied()
                    .ok_or_else(|| GridError::MissingFeature {
                        entity_id: record.entity_id.clone(),
                        feature: key.to_string(),
                    })
            })
            .collect::<Result<Vec<f64>>>()?;
        Vector::new(row.clone()).validate()?;
        rows.push(row);
    }

    let bounds: Vec<(f64, f64)> = (0..keys.len())
        .map(|k| {
            rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), row| {
                (lo.min(row[k]), hi.max(row[k]))
            })
        })
        .collect();

    Ok(records
        .iter()
        .zip(rows)
        .map(|(record, row)| {
            let scaled: Vec<f64> = row
                .iter()
                .zip(bounds.iter())
                .map(|(&v, &(min, max))| if max == min { 0.5 } else { (v - min) / (max - min) })
                .collect();
            Snapshot::new(
                record.entity_id.clone(),
                scaled,
                record.timestamp,
                record.source.clone(),
            )
        })
        .collect())
}
