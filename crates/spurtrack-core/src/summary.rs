//! Fleet-wide progress summary
//!
//! Aggregated statistics across all units, computed from the per-unit
//! projection. Answers the dashboard question: "How far along is the whole
//! package of works?"

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::UnitProgress;
use crate::status::WorkStatus;
use crate::PackageId;

/// Aggregated progress metrics across a set of units
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressSummary {
    /// Total number of tracked units
    pub total_units: usize,
    /// Units classified Completed
    pub completed_units: usize,
    /// Units classified In Progress
    pub in_progress_units: usize,
    /// Units classified Not Started
    pub not_started_units: usize,
    /// Units with a surveyed target length
    pub measured_units: usize,
    /// Total entries folded across all units
    pub total_entries: usize,
    /// Sum of completed length across all units (km)
    pub total_completed_length: f64,
    /// Sum of target length over measured units (km)
    pub measured_target_length: f64,
    /// Sum of completed length over measured units only (km)
    pub measured_completed_length: f64,
    /// Length-weighted overall completion percentage.
    ///
    /// Units without a surveyed target are excluded from both sides of the
    /// ratio, so an unknown denominator cannot distort the fleet figure.
    pub overall_percent: f64,
    /// Most recent report date across all units
    pub latest_report: Option<NaiveDate>,
}

impl ProgressSummary {
    /// Compute the summary from the per-unit projection
    pub fn from_progress(progress: &[UnitProgress]) -> Self {
        let mut completed_units = 0usize;
        let mut in_progress_units = 0usize;
        let mut not_started_units = 0usize;
        let mut measured_units = 0usize;
        let mut total_entries = 0usize;
        let mut total_completed_length = 0.0f64;
        let mut measured_target_length = 0.0f64;
        let mut measured_completed_length = 0.0f64;
        let mut latest_report: Option<NaiveDate> = None;

        for row in progress {
            match row.status {
                WorkStatus::Completed => completed_units += 1,
                WorkStatus::InProgress => in_progress_units += 1,
                WorkStatus::NotStarted => not_started_units += 1,
            }

            total_entries += row.record.entry_count;
            total_completed_length += row.record.total_completed;

            if let Some(target) = row.target_length {
                if target > 0.0 {
                    measured_units += 1;
                    measured_target_length += target;
                    measured_completed_length += row.record.total_completed;
                }
            }

            if let Some(date) = row.record.latest_date {
                latest_report = Some(match latest_report {
                    Some(current) if current >= date => current,
                    _ => date,
                });
            }
        }

        let overall_percent = if measured_target_length > 0.0 {
            measured_completed_length / measured_target_length * 100.0
        } else {
            0.0
        };

        Self {
            total_units: progress.len(),
            completed_units,
            in_progress_units,
            not_started_units,
            measured_units,
            total_entries,
            total_completed_length,
            measured_target_length,
            measured_completed_length,
            overall_percent,
            latest_report,
        }
    }
}

/// Per-package roll-up of the unit projection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackageRollup {
    /// Package the roll-up covers; None collects unassigned units
    pub package_id: Option<PackageId>,
    /// Units in the package
    pub units: usize,
    /// Completed length (km)
    pub completed_length: f64,
    /// Target length over measured units (km)
    pub target_length: f64,
    /// Length-weighted completion percentage
    pub percent: f64,
}

/// Roll the projection up by owning package, preserving first-seen order.
pub fn by_package(progress: &[UnitProgress]) -> Vec<PackageRollup> {
    let mut rollups: Vec<PackageRollup> = Vec::new();

    for row in progress {
        let slot = rollups
            .iter()
            .position(|r| r.package_id == row.package_id)
            .unwrap_or_else(|| {
                rollups.push(PackageRollup {
                    package_id: row.package_id.clone(),
                    units: 0,
                    completed_length: 0.0,
                    target_length: 0.0,
                    percent: 0.0,
                });
                rollups.len() - 1
            });

        let rollup = &mut rollups[slot];
        rollup.units += 1;
        if let Some(target) = row.target_length {
            if target > 0.0 {
                rollup.target_length += target;
                rollup.completed_length += row.record.total_completed;
            }
        }
    }

    for rollup in &mut rollups {
        rollup.percent = if rollup.target_length > 0.0 {
            rollup.completed_length / rollup.target_length * 100.0
        } else {
            0.0
        };
    }

    rollups
}

// ============================================================================
// Tests
// ============================================================================
