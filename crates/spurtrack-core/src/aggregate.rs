//! Cumulative progress aggregation
//!
//! Folds raw progress entries into one cumulative record per unit. The fold
//! is a pure projection: it is recomputed from the full entry set on every
//! report run and never stored.
//!
//! # Fold semantics
//!
//! - Grouping key is the unit ID, not the entry.
//! - Completed amounts are summed arithmetically; rounding to two decimals
//!   happens at presentation time only, so rounding error does not compound
//!   across entries.
//! - `latest_date` keeps the chronologically greatest entry date. Comparison
//!   is strictly-greater, so the first-seen entry wins on exact ties.
//! - An explicitly reported percentage is folded as a running maximum, kept
//!   only as a fallback display value for units with no surveyed target.
//! - Totals are NOT clamped at 100%: an over-target sum surfaces visibly
//!   instead of hiding a data-entry problem.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::status::{classify, WorkStatus};
use crate::{Dataset, PackageId, ProgressEntry, UnitId, UnitKind};

// ============================================================================
// Cumulative Record
// ============================================================================

/// The folded view of all progress entries for one unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRecord {
    /// Unit the record was folded for
    pub unit_id: UnitId,
    /// Arithmetic sum of incremental completed lengths (km)
    pub total_completed: f64,
    /// Chronologically greatest entry date; None when no entries exist
    pub latest_date: Option<NaiveDate>,
    /// Maximum upstream-reported percentage observed across entries
    pub reported_percent_max: Option<f64>,
    /// Free-text status label from the latest entry
    pub latest_note: Option<String>,
    /// Number of entries folded into this record
    pub entry_count: usize,
}

impl CumulativeRecord {
    /// An empty record for a unit with no entries yet
    pub fn empty(unit_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            total_completed: 0.0,
            latest_date: None,
            reported_percent_max: None,
            latest_note: None,
            entry_count: 0,
        }
    }

    /// Completion percentage recomputed from the target length.
    ///
    /// Returns 0 when the target is unknown or non-positive. The result is
    /// not clamped: a violated over-target invariant upstream shows up here
    /// as a value above 100.
    pub fn completion_percent(&self, target_length: Option<f64>) -> f64 {
        match target_length {
            Some(target) if target > 0.0 => self.total_completed / target * 100.0,
            _ => 0.0,
        }
    }

    /// Percentage to display: the recomputed value wherever the target is
    /// known, falling back to the stored upstream maximum otherwise. The two
    /// can legitimately disagree when upstream percentages are stale.
    pub fn display_percent(&self, target_length: Option<f64>) -> f64 {
        match target_length {
            Some(target) if target > 0.0 => self.completion_percent(target_length),
            _ => self.reported_percent_max.unwrap_or(0.0),
        }
    }
}

/// Fold a sequence of entries into one cumulative record per distinct unit.
///
/// Records come back in first-seen unit order. The fold is order-independent
/// for the sum; only the tie-break on `latest_date` depends on input order.
pub fn aggregate(entries: &[ProgressEntry]) -> Vec<CumulativeRecord> {
    let mut records: Vec<CumulativeRecord> = Vec::new();
    let mut index: HashMap<UnitId, usize> = HashMap::new();

    for entry in entries {
        let slot = *index.entry(entry.unit_id.clone()).or_insert_with(|| {
            records.push(CumulativeRecord::empty(entry.unit_id.clone()));
            records.len() - 1
        });
        let record = &mut records[slot];

        record.total_completed += entry.completed;
        record.entry_count += 1;

        let is_latest = match record.latest_date {
            Some(current) => entry.date > current,
            None => true,
        };
        if is_latest {
            record.latest_date = Some(entry.date);
            if entry.status_note.is_some() {
                record.latest_note = entry.status_note.clone();
            }
        }

        if let Some(percent) = entry.reported_percent {
            record.reported_percent_max = Some(match record.reported_percent_max {
                Some(current) => current.max(percent),
                None => percent,
            });
        }
    }

    records
}

// ============================================================================
// Unit Progress (record joined with unit metadata)
// ============================================================================

/// A cumulative record joined with the unit it describes.
///
/// This is the row shape every renderer consumes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitProgress {
    /// Unit identifier
    pub unit_id: UnitId,
    /// Unit display name
    pub name: String,
    /// Spur or length segment
    pub kind: UnitKind,
    /// Owning package, where known
    pub package_id: Option<PackageId>,
    /// Target length in km; None when not surveyed
    pub target_length: Option<f64>,
    /// Chainage marker for timeline placement
    pub chainage: Option<f64>,
    /// The folded record
    pub record: CumulativeRecord,
    /// Display percentage (recomputed where possible)
    pub percent: f64,
    /// Classified status
    pub status: WorkStatus,
}

/// Join the aggregation with unit metadata.
///
/// Units appear in dataset order, including units with no entries yet.
/// Entries referencing unknown unit IDs still produce rows (appended after
/// the known units, in first-seen order) so bad references stay visible in
/// the output instead of silently dropping data.
pub fn unit_progress(dataset: &Dataset) -> Vec<UnitProgress> {
    let records = aggregate(&dataset.entries);
    let mut by_unit: HashMap<&str, &CumulativeRecord> = HashMap::new();
    for record in &records {
        by_unit.insert(record.unit_id.as_str(), record);
    }

    let mut rows: Vec<UnitProgress> = Vec::new();

    for unit in &dataset.units {
        let record = by_unit
            .remove(unit.id.as_str())
            .cloned()
            .unwrap_or_else(|| CumulativeRecord::empty(unit.id.clone()));
        let percent = record.display_percent(unit.target_length);
        let status = classify(Some(percent), record.latest_note.as_deref());
        rows.push(UnitProgress {
            unit_id: unit.id.clone(),
            name: unit.name.clone(),
            kind: unit.kind,
            package_id: unit.package_id.clone(),
            target_length: unit.target_length,
            chainage: unit.chainage,
            record,
            percent,
            status,
        });
    }

    // Orphan records: entries whose unit never appeared in the feed
    for record in &records {
        if !by_unit.contains_key(record.unit_id.as_str()) {
            continue;
        }
        let percent = record.display_percent(None);
        let status = classify(Some(percent), record.latest_note.as_deref());
        rows.push(UnitProgress {
            unit_id: record.unit_id.clone(),
            name: record.unit_id.clone(),
            kind: UnitKind::default(),
            package_id: None,
            target_length: None,
            chainage: None,
            record: record.clone(),
            percent,
            status,
        });
    }

    rows
}

// ============================================================================
// Tests
// ============================================================================
