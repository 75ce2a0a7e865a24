//! # spurtrack-core
//!
//! Core domain model and progress aggregation for the spurtrack reporting
//! engine.
//!
//! This crate provides:
//! - Domain types: `Package`, `ProgressUnit`, `ProgressEntry`, `Dataset`
//! - The cumulative aggregator ([`aggregate`]) and fleet summary ([`summary`])
//! - Status classification ([`status`]) and positional mapping ([`timeline`])
//! - The `ReportRenderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use spurtrack_core::{Dataset, ProgressEntry, ProgressUnit, UnitKind, WorkStatus};
//!
//! let mut dataset = Dataset::new();
//! dataset.units.push(
//!     ProgressUnit::new("spur-7")
//!         .name("Spur at RD 12.400")
//!         .kind(UnitKind::Spur)
//!         .target_length(0.5),
//! );
//! dataset.entries.push(ProgressEntry::new(
//!     "spur-7",
//!     0.25,
//!     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
//! ));
//!
//! let progress = dataset.unit_progress();
//! assert_eq!(progress.len(), 1);
//! assert_eq!(progress[0].status, WorkStatus::InProgress);
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod aggregate;
pub mod status;
pub mod summary;
pub mod timeline;

pub use aggregate::{aggregate, unit_progress, CumulativeRecord, UnitProgress};
pub use status::{classify, WorkStatus};
pub use summary::ProgressSummary;
pub use timeline::ChainageWindow;

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for a progress unit (spur or length segment)
pub type UnitId = String;

/// Unique identifier for a work package
pub type PackageId = String;

/// Monetary amount with currency
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: impl Into<Decimal>, currency: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: currency.into(),
        }
    }
}

// ============================================================================
// Package
// ============================================================================

/// A work package: the contract-level grouping of spurs and length segments
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Package {
    /// Unique identifier (e.g. "NBC-04")
    pub id: PackageId,
    /// Name of the work covered by the package
    pub work_name: String,
    /// Executing contractor
    pub contractor: String,
    /// Administrative division
    pub division: Option<String>,
    /// Chainage window covered by the package, for timeline placement
    pub window: Option<ChainageWindow>,
    /// Contract value, where known
    pub contract_value: Option<Money>,
}

impl Package {
    /// Create a new package with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            work_name: id.clone(),
            id,
            contractor: String::new(),
            division: None,
            window: None,
            contract_value: None,
        }
    }

    /// Set the work name
    pub fn work_name(mut self, name: impl Into<String>) -> Self {
        self.work_name = name.into();
        self
    }

    /// Set the contractor name
    pub fn contractor(mut self, contractor: impl Into<String>) -> Self {
        self.contractor = contractor.into();
        self
    }

    /// Set the administrative division
    pub fn division(mut self, division: impl Into<String>) -> Self {
        self.division = Some(division.into());
        self
    }

    /// Set the chainage window
    pub fn window(mut self, window: ChainageWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Set the contract value
    pub fn contract_value(mut self, value: Money) -> Self {
        self.contract_value = Some(value);
        self
    }
}

// ============================================================================
// Progress Unit
// ============================================================================

/// Kind of physical unit being tracked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    /// A spur (protective groyne) at a fixed location
    #[default]
    Spur,
    /// A km-range length segment of the main work
    Segment,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Spur => "Spur",
            UnitKind::Segment => "Segment",
        }
    }
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A physical unit (spur or length segment) tracked for construction progress
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressUnit {
    /// Unique identifier
    pub id: UnitId,
    /// Human-readable name
    pub name: String,
    /// Spur or length segment
    pub kind: UnitKind,
    /// Target length in km; None when not yet surveyed
    pub target_length: Option<f64>,
    /// Chainage marker (km along the canal), for timeline placement
    pub chainage: Option<f64>,
    /// Owning work package
    pub package_id: Option<PackageId>,
}

impl ProgressUnit {
    /// Create a new unit with the given ID
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind: UnitKind::default(),
            target_length: None,
            chainage: None,
            package_id: None,
        }
    }

    /// Set the unit name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the unit kind
    pub fn kind(mut self, kind: UnitKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the target length in km
    pub fn target_length(mut self, length: f64) -> Self {
        self.target_length = Some(length);
        self
    }

    /// Set the chainage marker in km
    pub fn chainage(mut self, chainage: f64) -> Self {
        self.chainage = Some(chainage);
        self
    }

    /// Set the owning package
    pub fn package(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }
}

// ============================================================================
// Progress Entry
// ============================================================================

/// A single date-stamped progress report against one unit.
///
/// Entries are immutable value objects: corrections append new entries rather
/// than rewriting old ones.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Unit the entry belongs to
    pub unit_id: UnitId,
    /// Incremental completed length in km (not cumulative)
    pub completed: f64,
    /// Reporting date
    pub date: NaiveDate,
    /// Percentage as reported upstream; may be stale
    pub reported_percent: Option<f64>,
    /// Free-text status label from the field report
    pub status_note: Option<String>,
    /// Operator who recorded the entry
    pub recorded_by: Option<String>,
}

impl ProgressEntry {
    /// Create a new entry for the given unit
    pub fn new(unit_id: impl Into<String>, completed: f64, date: NaiveDate) -> Self {
        Self {
            unit_id: unit_id.into(),
            completed,
            date,
            reported_percent: None,
            status_note: None,
            recorded_by: None,
        }
    }

    /// Set the upstream-reported percentage
    pub fn reported_percent(mut self, percent: f64) -> Self {
        self.reported_percent = Some(percent);
        self
    }

    /// Set the free-text status label
    pub fn status_note(mut self, note: impl Into<String>) -> Self {
        self.status_note = Some(note.into());
        self
    }

    /// Set the recording operator
    pub fn recorded_by(mut self, operator: impl Into<String>) -> Self {
        self.recorded_by = Some(operator.into());
        self
    }
}

// ============================================================================
// Dataset
// ============================================================================

/// The full set of records a report is generated from.
///
/// A dataset is rebuilt from the feed on every run; cumulative records are a
/// pure projection over it and are never stored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Work packages
    pub packages: Vec<Package>,
    /// Tracked units
    pub units: Vec<ProgressUnit>,
    /// Raw progress entries
    pub entries: Vec<ProgressEntry>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a unit by ID
    pub fn unit(&self, id: &str) -> Option<&ProgressUnit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Look up a package by ID
    pub fn package(&self, id: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// All entries recorded against the given unit
    pub fn entries_for(&self, unit_id: &str) -> impl Iterator<Item = &ProgressEntry> {
        let unit_id = unit_id.to_string();
        self.entries.iter().filter(move |e| e.unit_id == unit_id)
    }

    /// Compute the per-unit cumulative progress projection
    pub fn unit_progress(&self) -> Vec<UnitProgress> {
        aggregate::unit_progress(self)
    }

    /// Compute the fleet-wide summary
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::from_progress(&self.unit_progress())
    }
}

// ============================================================================
// Report Context
// ============================================================================

/// Explicit context passed into report generators.
///
/// Carries the acting-user identity and report date so generators never read
/// them from ambient state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportContext {
    /// Date the report is generated for
    pub report_date: NaiveDate,
    /// Acting user shown in report headers
    pub generated_by: Option<String>,
    /// Override for the report heading; defaults to the package work name
    pub heading: Option<String>,
}

impl ReportContext {
    /// Create a context for the given report date
    pub fn new(report_date: NaiveDate) -> Self {
        Self {
            report_date,
            generated_by: None,
            heading: None,
        }
    }

    /// Set the acting user
    pub fn generated_by(mut self, user: impl Into<String>) -> Self {
        self.generated_by = Some(user.into());
        self
    }

    /// Set the report heading
    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Severity of a validation diagnostic
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Stable codes for validation diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Entry references a unit not present in the dataset
    UnknownUnit,
    /// Entry carries a negative completed amount
    NegativeAmount,
    /// Cumulative completed length exceeds the unit target
    OverTarget,
    /// Entry is dated after the as-of date
    FutureDated,
    /// Unit has no surveyed target length
    MissingTarget,
    /// Feed contains no progress entries
    EmptyFeed,
}

/// A single validation finding against a dataset
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Unit the finding refers to, where applicable
    pub unit_id: Option<UnitId>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            unit_id: None,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            unit_id: None,
        }
    }

    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code,
            message: message.into(),
            unit_id: None,
        }
    }

    /// Attach the unit the finding refers to
    pub fn unit(mut self, unit_id: impl Into<String>) -> Self {
        self.unit_id = Some(unit_id.into());
        self
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering for progress reports.
///
/// A renderer is purely presentational: it recomputes the projection from the
/// dataset it is handed and returns the finished document. Writing the result
/// to disk belongs to the caller.
pub trait ReportRenderer {
    type Output;

    /// Render the dataset to the output format
    fn render(&self, dataset: &Dataset, context: &ReportContext)
        -> Result<Self::Output, ReportError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Report generation error
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no progress data to report")]
    EmptyDataset,

    #[error("format error: {0}")]
    Format(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
