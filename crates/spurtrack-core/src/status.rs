//! Work status classification
//!
//! Maps a completion percentage, with a free-text field note as fallback, to
//! one of three states. The numeric percentage always takes precedence over
//! conflicting note text; note matching only applies when the percentage is
//! absent or zero.

use serde::{Deserialize, Serialize};

/// Construction status of a tracked unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkStatus {
    /// No measurable progress recorded
    #[default]
    NotStarted,
    /// Some progress recorded, below the target
    InProgress,
    /// Target reached or exceeded
    Completed,
}

impl WorkStatus {
    /// Get the display string for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::NotStarted => "Not Started",
            WorkStatus::InProgress => "In Progress",
            WorkStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a unit from its completion percentage and field note.
///
/// Total over all inputs: every percentage in `[0, ∞)` and every note string
/// maps to exactly one state.
///
/// - `Completed`: percentage >= 100, or the note says "completed"/"done"
/// - `InProgress`: 0 < percentage < 100, or the note matches an in-progress
///   synonym
/// - `NotStarted`: everything else, including empty/absent notes and the
///   "not started"/"pending" synonyms
///
/// A percentage of 100 or more yields `Completed` regardless of what the
/// note claims.
pub fn classify(percent: Option<f64>, note: Option<&str>) -> WorkStatus {
    if let Some(percent) = percent {
        if percent >= 100.0 {
            return WorkStatus::Completed;
        }
        if percent > 0.0 {
            return WorkStatus::InProgress;
        }
    }

    match note.map(|n| n.trim().to_lowercase()).as_deref() {
        Some("completed") | Some("done") => WorkStatus::Completed,
        Some("in_progress") | Some("in progress") | Some("in-progress") => WorkStatus::InProgress,
        _ => WorkStatus::NotStarted,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_thresholds() {
        assert_eq!(classify(Some(0.0), None), WorkStatus::NotStarted);
        assert_eq!(classify(Some(0.01), None), WorkStatus::InProgress);
        assert_eq!(classify(Some(50.0), None), WorkStatus::InProgress);
        assert_eq!(classify(Some(99.99), None), WorkStatus::InProgress);
        assert_eq!(classify(Some(100.0), None), WorkStatus::Completed);
        assert_eq!(classify(Some(130.0), None), WorkStatus::Completed);
    }

    #[test]
    fn percentage_overrides_conflicting_note() {
        assert_eq!(
            classify(Some(100.0), Some("not started")),
            WorkStatus::Completed
        );
        assert_eq!(classify(Some(45.0), Some("done")), WorkStatus::InProgress);
    }

    #[test]
    fn note_fallback_when_percentage_absent() {
        assert_eq!(classify(None, Some("completed")), WorkStatus::Completed);
        assert_eq!(classify(None, Some("Done")), WorkStatus::Completed);
        assert_eq!(classify(None, Some("in_progress")), WorkStatus::InProgress);
        assert_eq!(classify(None, Some("In Progress")), WorkStatus::InProgress);
        assert_eq!(classify(None, Some("in-progress")), WorkStatus::InProgress);
        assert_eq!(classify(None, Some("not started")), WorkStatus::NotStarted);
        assert_eq!(classify(None, Some("not-started")), WorkStatus::NotStarted);
        assert_eq!(classify(None, Some("pending")), WorkStatus::NotStarted);
    }

    #[test]
    fn note_fallback_when_percentage_zero() {
        assert_eq!(classify(Some(0.0), Some("done")), WorkStatus::Completed);
        assert_eq!(
            classify(Some(0.0), Some("in progress")),
            WorkStatus::InProgress
        );
    }

    #[test]
    fn unrecognized_input_maps_to_not_started() {
        assert_eq!(classify(None, None), WorkStatus::NotStarted);
        assert_eq!(classify(None, Some("")), WorkStatus::NotStarted);
        assert_eq!(classify(None, Some("   ")), WorkStatus::NotStarted);
        assert_eq!(classify(None, Some("monsoon halt")), WorkStatus::NotStarted);
    }

    #[test]
    fn note_matching_trims_whitespace() {
        assert_eq!(classify(None, Some("  Completed  ")), WorkStatus::Completed);
    }

    #[test]
    fn display_strings() {
        assert_eq!(WorkStatus::NotStarted.as_str(), "Not Started");
        assert_eq!(WorkStatus::InProgress.as_str(), "In Progress");
        assert_eq!(WorkStatus::Completed.as_str(), "Completed");
        assert_eq!(format!("{}", WorkStatus::Completed), "Completed");
    }
}
