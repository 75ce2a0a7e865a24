//! Excel progress report renderer
//!
//! Generates XLSX files with up to two sheets:
//! - Progress Summary: banner header, package info block, per-unit aggregate
//!   table with tier-colored percentages, fleet totals row
//! - Entries: flat per-entry detail table
//!
//! The percent color tiers come from [`crate::percent_tier`], the same
//! classification the PDF backend uses, so the two documents never disagree.
//!
//! ## Example Output Structure
//!
//! ```text
//! Sheet: Progress Summary
//! | Unit    | Name             | Kind | Target | Completed | Progress % | ...
//! |---------|------------------|------|--------|-----------|------------|
//! | spur-7  | Spur at RD 12.4  | Spur | 0.50   | 0.38      | 75.00      |
//! | ...     |                  |      |        |           |            |
//! | Fleet total              |        | 1.50   | 1.38      | 92.00      |
//!
//! Sheet: Entries
//! | Date       | Unit   | Completed (km) | Reported % | Note        | By  |
//! |------------|--------|----------------|------------|-------------|-----|
//! | 2024-01-10 | spur-7 | 0.13           | 25         | in progress | jdo |
//! ```

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};

use spurtrack_core::{
    Dataset, ProgressSummary, ReportContext, ReportError, ReportRenderer, UnitProgress,
};

use crate::{percent_tier, report_heading, PercentTier};

/// Excel progress report renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Whether to include the per-entry detail sheet
    pub include_detail: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            include_detail: true,
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the per-entry detail sheet
    pub fn no_detail(mut self) -> Self {
        self.include_detail = false;
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(
        &self,
        dataset: &Dataset,
        context: &ReportContext,
    ) -> Result<Vec<u8>, ReportError> {
        let progress = dataset.unit_progress();
        if progress.is_empty() {
            return Err(ReportError::EmptyDataset);
        }
        let summary = ProgressSummary::from_progress(&progress);

        let mut workbook = Workbook::new();
        let formats = create_formats();

        self.add_summary_sheet(&mut workbook, dataset, context, &progress, &summary, &formats)?;

        if self.include_detail {
            self.add_entries_sheet(&mut workbook, dataset, &formats)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| ReportError::Format(format!("Failed to create Excel: {e}")))
    }

    /// Add the Progress Summary sheet
    fn add_summary_sheet(
        &self,
        workbook: &mut Workbook,
        dataset: &Dataset,
        context: &ReportContext,
        progress: &[UnitProgress],
        summary: &ProgressSummary,
        formats: &ExcelFormats,
    ) -> Result<(), ReportError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Progress Summary")
            .map_err(|e| ReportError::Format(e.to_string()))?;

        // Banner across the full table width
        sheet
            .merge_range(0, 0, 0, 8, &report_heading(dataset, context), &formats.banner)
            .map_err(|e| ReportError::Format(e.to_string()))?;

        // Info block
        let mut info: Vec<(&str, String)> = Vec::new();
        if let Some(package) = dataset.packages.first() {
            info.push(("Package", package.id.clone()));
            info.push(("Work", package.work_name.clone()));
            if !package.contractor.is_empty() {
                info.push(("Contractor", package.contractor.clone()));
            }
            if let Some(division) = &package.division {
                info.push(("Division", division.clone()));
            }
        }
        info.push(("Report date", context.report_date.to_string()));
        if let Some(user) = &context.generated_by {
            info.push(("Generated by", user.clone()));
        }

        let mut row = 2u32;
        for (label, value) in info {
            sheet
                .write_with_format(row, 0, label, &formats.info_label)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 1, &value, &formats.info_value)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            row += 1;
        }
        row += 1;

        // Aggregate table
        let headers = [
            "Unit",
            "Name",
            "Kind",
            "Package",
            "Target (km)",
            "Completed (km)",
            "Progress %",
            "Entries",
            "Last Report",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_with_format(row, col as u16, *header, &formats.header)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }
        row += 1;

        for unit in progress {
            sheet
                .write_with_format(row, 0, &unit.unit_id, &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 1, &unit.name, &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 2, unit.kind.as_str(), &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 3, unit.package_id.as_deref().unwrap_or(""), &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            match unit.target_length {
                Some(target) => sheet
                    .write_with_format(row, 4, target, &formats.number)
                    .map_err(|e| ReportError::Format(e.to_string()))?,
                None => sheet
                    .write_with_format(row, 4, "-", &formats.text)
                    .map_err(|e| ReportError::Format(e.to_string()))?,
            };
            sheet
                .write_with_format(row, 5, unit.record.total_completed, &formats.number)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 6, unit.percent, percent_format(formats, unit.percent))
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 7, unit.record.entry_count as u32, &formats.integer)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            let last_report = unit
                .record
                .latest_date
                .map(|d| d.to_string())
                .unwrap_or_default();
            sheet
                .write_with_format(row, 8, &last_report, &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            row += 1;
        }

        // Fleet totals
        sheet
            .write_with_format(row, 0, "Fleet total", &formats.total_row)
            .map_err(|e| ReportError::Format(e.to_string()))?;
        for col in 1..4u16 {
            sheet
                .write_with_format(row, col, "", &formats.total_row)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }
        sheet
            .write_with_format(row, 4, summary.measured_target_length, &formats.total_number)
            .map_err(|e| ReportError::Format(e.to_string()))?;
        sheet
            .write_with_format(row, 5, summary.measured_completed_length, &formats.total_number)
            .map_err(|e| ReportError::Format(e.to_string()))?;
        sheet
            .write_with_format(row, 6, summary.overall_percent, &formats.total_number)
            .map_err(|e| ReportError::Format(e.to_string()))?;
        sheet
            .write_with_format(row, 7, summary.total_entries as u32, &formats.total_row)
            .map_err(|e| ReportError::Format(e.to_string()))?;
        let latest = summary
            .latest_report
            .map(|d| d.to_string())
            .unwrap_or_default();
        sheet
            .write_with_format(row, 8, &latest, &formats.total_row)
            .map_err(|e| ReportError::Format(e.to_string()))?;

        // Column widths
        sheet.set_column_width(0, 12).ok();
        sheet.set_column_width(1, 32).ok();
        sheet.set_column_width(2, 10).ok();
        sheet.set_column_width(3, 10).ok();
        sheet.set_column_width(4, 12).ok();
        sheet.set_column_width(5, 14).ok();
        sheet.set_column_width(6, 12).ok();
        sheet.set_column_width(7, 9).ok();
        sheet.set_column_width(8, 12).ok();

        Ok(())
    }

    /// Add the per-entry detail sheet
    fn add_entries_sheet(
        &self,
        workbook: &mut Workbook,
        dataset: &Dataset,
        formats: &ExcelFormats,
    ) -> Result<(), ReportError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Entries")
            .map_err(|e| ReportError::Format(e.to_string()))?;

        let headers = ["Date", "Unit", "Completed (km)", "Reported %", "Note", "Recorded By"];
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }

        for (i, entry) in dataset.entries.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet
                .write_with_format(row, 0, entry.date.to_string(), &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 1, &entry.unit_id, &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 2, entry.completed, &formats.number)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            match entry.reported_percent {
                Some(percent) => sheet
                    .write_with_format(row, 3, percent, &formats.number)
                    .map_err(|e| ReportError::Format(e.to_string()))?,
                None => sheet
                    .write_with_format(row, 3, "", &formats.text)
                    .map_err(|e| ReportError::Format(e.to_string()))?,
            };
            sheet
                .write_with_format(row, 4, entry.status_note.as_deref().unwrap_or(""), &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 5, entry.recorded_by.as_deref().unwrap_or(""), &formats.text)
                .map_err(|e| ReportError::Format(e.to_string()))?;
        }

        sheet.set_column_width(0, 12).ok();
        sheet.set_column_width(1, 12).ok();
        sheet.set_column_width(2, 14).ok();
        sheet.set_column_width(3, 11).ok();
        sheet.set_column_width(4, 28).ok();
        sheet.set_column_width(5, 14).ok();

        Ok(())
    }
}

impl ReportRenderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, dataset: &Dataset, context: &ReportContext) -> Result<Vec<u8>, ReportError> {
        self.render_to_bytes(dataset, context)
    }
}

// ============================================================================
// Formats
// ============================================================================

/// Reusable cell formats
struct ExcelFormats {
    banner: Format,
    info_label: Format,
    info_value: Format,
    header: Format,
    text: Format,
    number: Format,
    integer: Format,
    percent_high: Format,
    percent_mid: Format,
    percent_low: Format,
    total_row: Format,
    total_number: Format,
}

fn create_formats() -> ExcelFormats {
    let banner = Format::new()
        .set_bold()
        .set_font_size(14)
        .set_align(FormatAlign::Center)
        .set_background_color(0x1F4E79)
        .set_font_color(0xFFFFFF);

    let info_label = Format::new().set_bold();
    let info_value = Format::new();

    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(0x4472C4)
        .set_font_color(0xFFFFFF)
        .set_border(FormatBorder::Thin);

    let text = Format::new().set_border(FormatBorder::Thin);

    let number = Format::new()
        .set_num_format("#,##0.00")
        .set_border(FormatBorder::Thin);

    let integer = Format::new()
        .set_num_format("#,##0")
        .set_border(FormatBorder::Thin);

    let percent_high = Format::new()
        .set_num_format("0.00")
        .set_background_color(PercentTier::High.rgb())
        .set_font_color(0xFFFFFF)
        .set_border(FormatBorder::Thin);

    let percent_mid = Format::new()
        .set_num_format("0.00")
        .set_background_color(PercentTier::Mid.rgb())
        .set_border(FormatBorder::Thin);

    let percent_low = Format::new()
        .set_num_format("0.00")
        .set_background_color(PercentTier::Low.rgb())
        .set_font_color(0xFFFFFF)
        .set_border(FormatBorder::Thin);

    let total_row = Format::new()
        .set_bold()
        .set_background_color(0xE2EFDA)
        .set_border(FormatBorder::Thin);

    let total_number = Format::new()
        .set_bold()
        .set_num_format("#,##0.00")
        .set_background_color(0xE2EFDA)
        .set_border(FormatBorder::Thin);

    ExcelFormats {
        banner,
        info_label,
        info_value,
        header,
        text,
        number,
        integer,
        percent_high,
        percent_mid,
        percent_low,
        total_row,
        total_number,
    }
}

fn percent_format(formats: &ExcelFormats, percent: f64) -> &Format {
    match percent_tier(percent) {
        PercentTier::High => &formats.percent_high,
        PercentTier::Mid => &formats.percent_mid,
        PercentTier::Low => &formats.percent_low,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use spurtrack_core::{ChainageWindow, Package, ProgressEntry, ProgressUnit, UnitKind};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn test_dataset() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.packages.push(
            Package::new("NBC-04")
                .work_name("Nohar Branch Canal, Reach 2")
                .contractor("M/s Verma Constructions")
                .division("Hanumangarh Division")
                .window(ChainageWindow::new(10.0, 20.0)),
        );
        dataset.units.push(
            ProgressUnit::new("spur-7")
                .name("Spur at RD 12.400")
                .kind(UnitKind::Spur)
                .target_length(0.5)
                .package("NBC-04"),
        );
        dataset.units.push(ProgressUnit::new("seg-2").kind(UnitKind::Segment));
        dataset
            .entries
            .push(ProgressEntry::new("spur-7", 0.375, date(2024, 2, 10)).recorded_by("jdo-ee"));
        dataset
            .entries
            .push(ProgressEntry::new("seg-2", 0.2, date(2024, 3, 1)).status_note("in progress"));
        dataset
    }

    fn test_context() -> ReportContext {
        ReportContext::new(date(2024, 6, 1)).generated_by("xen-hmh")
    }

    #[test]
    fn produces_xlsx_bytes() {
        let bytes = ExcelRenderer::new()
            .render_to_bytes(&test_dataset(), &test_context())
            .unwrap();
        // XLSX is a zip container
        assert!(bytes.len() > 500);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn no_detail_still_produces_workbook() {
        let bytes = ExcelRenderer::new()
            .no_detail()
            .render_to_bytes(&test_dataset(), &test_context())
            .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_dataset_fails() {
        let result = ExcelRenderer::new().render_to_bytes(&Dataset::new(), &test_context());
        assert!(matches!(result, Err(ReportError::EmptyDataset)));
    }

    #[test]
    fn renderer_trait_output_matches_bytes() {
        let renderer = ExcelRenderer::new();
        let dataset = test_dataset();
        let context = test_context();
        let direct = renderer.render_to_bytes(&dataset, &context).unwrap();
        let via_trait = renderer.render(&dataset, &context).unwrap();
        assert_eq!(direct.len(), via_trait.len());
    }

    #[test]
    fn percent_format_follows_tier() {
        let formats = create_formats();
        assert!(std::ptr::eq(percent_format(&formats, 90.0), &formats.percent_high));
        assert!(std::ptr::eq(percent_format(&formats, 60.0), &formats.percent_mid));
        assert!(std::ptr::eq(percent_format(&formats, 10.0), &formats.percent_low));
    }
}
