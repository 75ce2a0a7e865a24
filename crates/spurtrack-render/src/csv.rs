//! CSV export of the cumulative summary table
//!
//! One row per unit, floats rounded to two decimals at write time. The
//! quoting rules of the csv crate keep embedded commas in names safe, so a
//! re-parse recovers unit IDs and totals exactly (modulo the 2-decimal
//! rounding).

use chrono::NaiveDate;
// Leading :: disambiguates the csv crate from this module
use ::csv::WriterBuilder;

use spurtrack_core::{Dataset, ReportContext, ReportError, ReportRenderer};

/// Filename for a generated export: `<entity>_<id>_<date>.csv`
pub fn report_filename(entity: &str, id: &str, date: NaiveDate) -> String {
    format!("{}_{}_{}.csv", entity, id, date.format("%Y-%m-%d"))
}

/// CSV summary export renderer
#[derive(Clone, Debug)]
pub struct CsvRenderer {
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for CsvRenderer {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default field delimiter
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl ReportRenderer for CsvRenderer {
    type Output = String;

    fn render(&self, dataset: &Dataset, _context: &ReportContext) -> Result<String, ReportError> {
        let progress = dataset.unit_progress();
        if progress.is_empty() {
            return Err(ReportError::EmptyDataset);
        }

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());

        writer
            .write_record([
                "unit_id",
                "name",
                "kind",
                "package",
                "target_length_km",
                "completed_km",
                "progress_percent",
                "entries",
                "last_report",
                "status",
            ])
            .map_err(|e| ReportError::Format(e.to_string()))?;

        for row in &progress {
            let target = row
                .target_length
                .map(|t| format!("{t:.2}"))
                .unwrap_or_default();
            let last_report = row
                .record
                .latest_date
                .map(|d| d.to_string())
                .unwrap_or_default();

            writer
                .write_record([
                    row.unit_id.as_str(),
                    row.name.as_str(),
                    row.kind.as_str(),
                    row.package_id.as_deref().unwrap_or(""),
                    target.as_str(),
                    format!("{:.2}", row.record.total_completed).as_str(),
                    format!("{:.2}", row.percent).as_str(),
                    row.record.entry_count.to_string().as_str(),
                    last_report.as_str(),
                    row.status.as_str(),
                ])
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Format(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ReportError::Format(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
