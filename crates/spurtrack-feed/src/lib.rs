//! # spurtrack-feed
//!
//! Normalization adapter for progress feed exports.
//!
//! The monitoring backend has shipped several generations of field names and
//! response envelopes. All of that variance is absorbed here, once, at the
//! boundary: the raw serde types declare every historical alias, and the rest
//! of the system only ever sees canonical [`Dataset`] records. Consumers must
//! never sniff response shapes themselves.
//!
//! Two document shapes are accepted:
//!
//! - the versioned envelope
//!   `{"version": 1, "packages": [...], "units": [...], "entries": [...]}`
//! - the legacy bare array of entries (treated as version 1, no metadata)
//!
//! ## Example
//!
//! ```rust
//! let json = r#"{
//!     "version": 1,
//!     "units": [{"id": "spur-7", "target_length": 0.5}],
//!     "entries": [{"unit_id": "spur-7", "completed": 0.25, "date": "2024-01-15"}]
//! }"#;
//!
//! let dataset = spurtrack_feed::parse_feed(json).unwrap();
//! assert_eq!(dataset.units.len(), 1);
//! assert_eq!(dataset.entries.len(), 1);
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use spurtrack_core::{
    aggregate, ChainageWindow, Dataset, Diagnostic, DiagnosticCode, Money, Package, ProgressEntry,
    ProgressUnit, UnitKind,
};

/// Feed schema version this adapter understands
pub const FEED_VERSION: u32 = 1;

/// Feed parsing error
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported feed version {0} (expected {FEED_VERSION})")]
    UnsupportedVersion(u32),
}

// ============================================================================
// Raw (wire) types
// ============================================================================

/// A feed document: versioned envelope, or the legacy bare entry array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedDocument {
    Envelope(RawEnvelope),
    Entries(Vec<RawEntry>),
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    version: Option<u32>,
    #[serde(default)]
    packages: Vec<RawPackage>,
    #[serde(default)]
    units: Vec<RawUnit>,
    #[serde(default)]
    entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    #[serde(alias = "package_id", alias = "packageId")]
    id: String,
    #[serde(alias = "work", alias = "workName")]
    work_name: Option<String>,
    #[serde(alias = "agency")]
    contractor: Option<String>,
    division: Option<String>,
    #[serde(alias = "rd_start", alias = "start_km")]
    window_start: Option<f64>,
    #[serde(alias = "rd_end", alias = "end_km")]
    window_end: Option<f64>,
    #[serde(alias = "amount", alias = "contractValue")]
    contract_value: Option<Decimal>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUnit {
    #[serde(alias = "unit_id", alias = "spur_id", alias = "spurId")]
    id: String,
    #[serde(alias = "title")]
    name: Option<String>,
    #[serde(alias = "type")]
    kind: Option<String>,
    #[serde(alias = "total_length", alias = "targetLength", alias = "length")]
    target_length: Option<f64>,
    #[serde(alias = "rd", alias = "location")]
    chainage: Option<f64>,
    #[serde(alias = "package", alias = "packageId")]
    package_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(alias = "spur_id", alias = "unit", alias = "unitId")]
    unit_id: String,
    #[serde(alias = "completed_length", alias = "completedLength", alias = "work_done")]
    completed: f64,
    #[serde(alias = "reported_on", alias = "entry_date")]
    date: NaiveDate,
    #[serde(alias = "percentage", alias = "reported_percent")]
    percent: Option<f64>,
    #[serde(alias = "status_note", alias = "remark", alias = "remarks")]
    status: Option<String>,
    #[serde(alias = "created_by", alias = "operator")]
    recorded_by: Option<String>,
}

// ============================================================================
// Normalization
// ============================================================================

/// Parse a feed document into a canonical dataset.
///
/// This is the only place wire shapes are interpreted. An explicit version
/// other than [`FEED_VERSION`] is rejected rather than guessed at.
pub fn parse_feed(input: &str) -> Result<Dataset, FeedError> {
    let document: FeedDocument = serde_json::from_str(input)?;

    let envelope = match document {
        FeedDocument::Envelope(envelope) => envelope,
        FeedDocument::Entries(entries) => RawEnvelope {
            version: None,
            packages: Vec::new(),
            units: Vec::new(),
            entries,
        },
    };

    if let Some(version) = envelope.version {
        if version != FEED_VERSION {
            return Err(FeedError::UnsupportedVersion(version));
        }
    }

    let mut dataset = Dataset::new();

    for raw in envelope.packages {
        let mut package = Package::new(raw.id);
        if let Some(work_name) = raw.work_name {
            package = package.work_name(work_name);
        }
        if let Some(contractor) = raw.contractor {
            package = package.contractor(contractor);
        }
        if let Some(division) = raw.division {
            package = package.division(division);
        }
        if let (Some(start), Some(end)) = (raw.window_start, raw.window_end) {
            package = package.window(ChainageWindow::new(start, end));
        }
        if let Some(amount) = raw.contract_value {
            let currency = raw.currency.unwrap_or_else(|| "INR".to_string());
            package = package.contract_value(Money::new(amount, currency));
        }
        dataset.packages.push(package);
    }

    for raw in envelope.units {
        let mut unit = ProgressUnit::new(raw.id).kind(parse_kind(raw.kind.as_deref()));
        if let Some(name) = raw.name {
            unit = unit.name(name);
        }
        if let Some(target) = raw.target_length {
            unit = unit.target_length(target);
        }
        if let Some(chainage) = raw.chainage {
            unit = unit.chainage(chainage);
        }
        if let Some(package_id) = raw.package_id {
            unit = unit.package(package_id);
        }
        dataset.units.push(unit);
    }

    for raw in envelope.entries {
        let mut entry = ProgressEntry::new(raw.unit_id, raw.completed, raw.date);
        if let Some(percent) = raw.percent {
            entry = entry.reported_percent(percent);
        }
        if let Some(status) = raw.status {
            entry = entry.status_note(status);
        }
        if let Some(recorded_by) = raw.recorded_by {
            entry = entry.recorded_by(recorded_by);
        }
        dataset.entries.push(entry);
    }

    Ok(dataset)
}

fn parse_kind(kind: Option<&str>) -> UnitKind {
    match kind.map(|k| k.trim().to_lowercase()).as_deref() {
        Some("segment") | Some("length") | Some("reach") => UnitKind::Segment,
        _ => UnitKind::Spur,
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validate a normalized dataset, returning findings sorted by severity.
///
/// Over-target cumulative totals are a warning, not an error: the aggregator
/// deliberately reports them unclamped so data-quality problems stay visible.
/// Rejection of individual over-capacity submissions belongs to the entry
/// capture surface, which is out of scope here.
pub fn validate(dataset: &Dataset, as_of: NaiveDate) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if dataset.entries.is_empty() {
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::EmptyFeed,
            "feed contains no progress entries",
        ));
    }

    for entry in &dataset.entries {
        if dataset.unit(&entry.unit_id).is_none() {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::UnknownUnit,
                    format!("entry references unknown unit '{}'", entry.unit_id),
                )
                .unit(entry.unit_id.clone()),
            );
        }
        if entry.completed < 0.0 {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::NegativeAmount,
                    format!(
                        "entry for '{}' has negative completed length {}",
                        entry.unit_id, entry.completed
                    ),
                )
                .unit(entry.unit_id.clone()),
            );
        }
        if entry.date > as_of {
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticCode::FutureDated,
                    format!("entry for '{}' is dated {} (in the future)", entry.unit_id, entry.date),
                )
                .unit(entry.unit_id.clone()),
            );
        }
    }

    for record in aggregate(&dataset.entries) {
        let Some(unit) = dataset.unit(&record.unit_id) else {
            continue;
        };
        match unit.target_length {
            Some(target) if target > 0.0 => {
                if record.total_completed > target {
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticCode::OverTarget,
                            format!(
                                "cumulative completed {:.2} km exceeds target {:.2} km for '{}'",
                                record.total_completed, target, record.unit_id
                            ),
                        )
                        .unit(record.unit_id.clone()),
                    );
                }
            }
            _ => {
                diagnostics.push(
                    Diagnostic::info(
                        DiagnosticCode::MissingTarget,
                        format!(
                            "unit '{}' has progress entries but no surveyed target length",
                            record.unit_id
                        ),
                    )
                    .unit(record.unit_id.clone()),
                );
            }
        }
    }

    diagnostics.sort_by(|a, b| b.severity.cmp(&a.severity));
    diagnostics
}

// ============================================================================
// Tests
// ============================================================================
