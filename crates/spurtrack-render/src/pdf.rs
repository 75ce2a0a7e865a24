//! PDF progress report renderer
//!
//! Lays out the cumulative projection as a paginated A4 document:
//! - colored banner header with the report heading
//! - package info block (work, contractor, division, report date, user)
//! - fixed-column aggregate table with inline progress bars drawn as filled
//!   rectangles, tier-colored via [`crate::percent_tier`]
//! - fleet totals line and "Page n of m" footers
//!
//! PDF coordinates are bottom-left origin in millimetres; all layout here is
//! expressed in mm on an A4 portrait page. Page totals for the footer are
//! derived from the same geometry the drawing loop uses, so the count cannot
//! drift from the layout.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use spurtrack_core::{
    Dataset, ProgressSummary, ReportContext, ReportError, ReportRenderer, UnitProgress,
};

use crate::{percent_tier, report_heading, truncate};

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 15.0;
const BANNER_HEIGHT: f64 = 18.0;
const ROW_HEIGHT: f64 = 7.0;
const INFO_LINE_HEIGHT: f64 = 5.5;
const TABLE_BOTTOM: f64 = 28.0;
const BAR_WIDTH: f64 = 40.0;
const BAR_HEIGHT: f64 = 3.6;

// Table column x positions (mm)
const COL_UNIT: f64 = MARGIN;
const COL_NAME: f64 = 46.0;
const COL_TARGET: f64 = 104.0;
const COL_DONE: f64 = 124.0;
const COL_BAR: f64 = 144.0;
const COL_PERCENT: f64 = 187.0;

/// PDF progress report renderer
#[derive(Clone, Debug, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate PDF document bytes
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
        let heading = report_heading(dataset, context);
        let info = info_lines(dataset, context);

        // The totals line takes one row slot at the end of the table
        let first_table_y = info_block_bottom(info.len());
        let total_pages = count_pages(
            progress.len() + 1,
            rows_that_fit(first_table_y),
            rows_that_fit(continuation_table_y()),
        );

        let (doc, page, layer) =
            PdfDocument::new(heading.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Format(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Format(e.to_string()))?;

        let mut page_number = 1usize;
        let mut current = doc.get_page(page).get_layer(layer);

        draw_banner(&current, &heading, &font_bold);
        draw_info_block(&current, &info, &font, &font_bold);

        draw_table_header(&current, &font_bold, first_table_y);
        let mut y = first_table_y - ROW_HEIGHT;

        for row in &progress {
            if y < TABLE_BOTTOM {
                draw_footer(&current, &font, page_number, total_pages);
                let (next_page, next_layer) = doc.add_page(
                    Mm(PAGE_WIDTH),
                    Mm(PAGE_HEIGHT),
                    format!("Page {}", page_number + 1),
                );
                current = doc.get_page(next_page).get_layer(next_layer);
                page_number += 1;

                draw_table_header(&current, &font_bold, continuation_table_y());
                y = continuation_table_y() - ROW_HEIGHT;
            }

            draw_unit_row(&current, row, &font, y);
            y -= ROW_HEIGHT;
        }

        // Fleet totals line under the table
        if y < TABLE_BOTTOM {
            draw_footer(&current, &font, page_number, total_pages);
            let (next_page, next_layer) = doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Page {}", page_number + 1),
            );
            current = doc.get_page(next_page).get_layer(next_layer);
            page_number += 1;
            y = continuation_table_y() - ROW_HEIGHT;
        }
        current.set_fill_color(rgb(44, 62, 80));
        current.use_text(
            format!(
                "Fleet completion: {:.1}% ({:.2} / {:.2} km, {} units)",
                summary.overall_percent,
                summary.measured_completed_length,
                summary.measured_target_length,
                summary.total_units
            ),
            10.0,
            Mm(COL_UNIT),
            Mm(y),
            &font_bold,
        );
        draw_footer(&current, &font, page_number, total_pages);

        let mut buffer = std::io::BufWriter::new(Vec::new());
        doc.save(&mut buffer)
            .map_err(|e| ReportError::Format(format!("Failed to create PDF: {e}")))?;
        buffer
            .into_inner()
            .map_err(|e| ReportError::Format(e.to_string()))
    }
}

impl ReportRenderer for PdfRenderer {
    type Output = Vec<u8>;

    fn render(&self, dataset: &Dataset, context: &ReportContext) -> Result<Vec<u8>, ReportError> {
        self.render_to_bytes(dataset, context)
    }
}

// ============================================================================
// Geometry
// ============================================================================

/// Table start y on a continuation page
fn continuation_table_y() -> f64 {
    PAGE_HEIGHT - MARGIN - 5.0
}

/// Table start y on the first page, below the info block
fn info_block_bottom(info_len: usize) -> f64 {
    PAGE_HEIGHT - BANNER_HEIGHT - 10.0 - INFO_LINE_HEIGHT * info_len as f64 - 4.0
}

/// Number of table rows that fit below the given table start y
fn rows_that_fit(table_y: f64) -> usize {
    let mut rows = 0usize;
    let mut y = table_y - ROW_HEIGHT;
    while y >= TABLE_BOTTOM {
        rows += 1;
        y -= ROW_HEIGHT;
    }
    rows
}

fn count_pages(rows: usize, first_capacity: usize, cont_capacity: usize) -> usize {
    if rows <= first_capacity {
        1
    } else {
        1 + (rows - first_capacity).div_ceil(cont_capacity)
    }
}

// ============================================================================
// Drawing helpers
// ============================================================================

fn filled_rect(x: f64, y: f64, width: f64, height: f64) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y + height)), false),
            (Point::new(Mm(x), Mm(y + height)), false),
        ],
        is_closed: true,
        has_fill: true,
        has_stroke: false,
        is_clipping_path: false,
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        None,
    ))
}

fn info_lines(dataset: &Dataset, context: &ReportContext) -> Vec<(&'static str, String)> {
    let mut info: Vec<(&'static str, String)> = Vec::new();
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
    info
}

fn draw_banner(layer: &PdfLayerReference, heading: &str, font_bold: &IndirectFontRef) {
    layer.set_fill_color(rgb(31, 78, 121));
    layer.add_shape(filled_rect(0.0, PAGE_HEIGHT - BANNER_HEIGHT, PAGE_WIDTH, BANNER_HEIGHT));

    layer.set_fill_color(rgb(255, 255, 255));
    layer.use_text(
        truncate(heading, 60),
        14.0,
        Mm(MARGIN),
        Mm(PAGE_HEIGHT - BANNER_HEIGHT + 6.5),
        font_bold,
    );
}

fn draw_info_block(
    layer: &PdfLayerReference,
    info: &[(&'static str, String)],
    font: &IndirectFontRef,
    font_bold: &IndirectFontRef,
) {
    layer.set_fill_color(rgb(44, 62, 80));
    let mut y = PAGE_HEIGHT - BANNER_HEIGHT - 10.0;
    for (label, value) in info {
        layer.use_text(format!("{label}:"), 9.0, Mm(MARGIN), Mm(y), font_bold);
        layer.use_text(truncate(value, 70), 9.0, Mm(MARGIN + 28.0), Mm(y), font);
        y -= INFO_LINE_HEIGHT;
    }
}

fn draw_table_header(layer: &PdfLayerReference, font_bold: &IndirectFontRef, y: f64) {
    layer.set_fill_color(rgb(68, 114, 196));
    layer.add_shape(filled_rect(MARGIN - 2.0, y - 2.0, PAGE_WIDTH - 2.0 * MARGIN + 4.0, 6.5));

    layer.set_fill_color(rgb(255, 255, 255));
    layer.use_text("Unit", 9.0, Mm(COL_UNIT), Mm(y), font_bold);
    layer.use_text("Name", 9.0, Mm(COL_NAME), Mm(y), font_bold);
    layer.use_text("Target km", 9.0, Mm(COL_TARGET), Mm(y), font_bold);
    layer.use_text("Done km", 9.0, Mm(COL_DONE), Mm(y), font_bold);
    layer.use_text("Progress", 9.0, Mm(COL_BAR), Mm(y), font_bold);
    layer.use_text("%", 9.0, Mm(COL_PERCENT), Mm(y), font_bold);
}

fn draw_unit_row(layer: &PdfLayerReference, row: &UnitProgress, font: &IndirectFontRef, y: f64) {
    layer.set_fill_color(rgb(44, 62, 80));
    layer.use_text(truncate(&row.unit_id, 16), 9.0, Mm(COL_UNIT), Mm(y), font);
    layer.use_text(truncate(&row.name, 30), 9.0, Mm(COL_NAME), Mm(y), font);
    let target = row
        .target_length
        .map(|t| format!("{t:.2}"))
        .unwrap_or_else(|| "-".to_string());
    layer.use_text(target, 9.0, Mm(COL_TARGET), Mm(y), font);
    layer.use_text(
        format!("{:.2}", row.record.total_completed),
        9.0,
        Mm(COL_DONE),
        Mm(y),
        font,
    );

    // Progress bar: grey track with a tier-colored fill
    layer.set_fill_color(rgb(224, 224, 224));
    layer.add_shape(filled_rect(COL_BAR, y - 0.6, BAR_WIDTH, BAR_HEIGHT));

    let fill = row.percent.clamp(0.0, 100.0) / 100.0 * BAR_WIDTH;
    if fill > 0.0 {
        let (r, g, b) = percent_tier(row.percent).rgb_f64();
        layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        layer.add_shape(filled_rect(COL_BAR, y - 0.6, fill, BAR_HEIGHT));
    }

    layer.set_fill_color(rgb(44, 62, 80));
    layer.use_text(format!("{:.1}", row.percent), 9.0, Mm(COL_PERCENT), Mm(y), font);
}

fn draw_footer(layer: &PdfLayerReference, font: &IndirectFontRef, page: usize, total: usize) {
    layer.set_fill_color(rgb(120, 120, 120));
    layer.use_text(
        format!("Page {page} of {total}"),
        8.0,
        Mm(PAGE_WIDTH / 2.0 - 8.0),
        Mm(12.0),
        font,
    );
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use spurtrack_core::{Package, ProgressEntry, ProgressUnit};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn test_dataset(units: usize) -> Dataset {
        let mut dataset = Dataset::new();
        dataset.packages.push(
            Package::new("NBC-04")
                .work_name("Nohar Branch Canal, Reach 2")
                .contractor("M/s Verma Constructions"),
        );
        for i in 0..units {
            let id = format!("spur-{i}");
            dataset.units.push(ProgressUnit::new(&id).target_length(1.0));
            dataset
                .entries
                .push(ProgressEntry::new(&id, 0.5, date(2024, 2, 1)));
        }
        dataset
    }

    fn test_context() -> ReportContext {
        ReportContext::new(date(2024, 6, 1)).generated_by("xen-hmh")
    }

    #[test]
    fn produces_pdf_bytes() {
        let bytes = PdfRenderer::new()
            .render_to_bytes(&test_dataset(3), &test_context())
            .unwrap();
        assert!(bytes.len() > 500);
        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn large_dataset_still_renders() {
        let bytes = PdfRenderer::new()
            .render_to_bytes(&test_dataset(80), &test_context())
            .unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
        // 80 rows and the totals line need three pages with this geometry
        let first = rows_that_fit(info_block_bottom(5));
        let cont = rows_that_fit(continuation_table_y());
        assert_eq!(count_pages(81, first, cont), 3);
    }

    #[test]
    fn empty_dataset_fails() {
        let result = PdfRenderer::new().render_to_bytes(&Dataset::new(), &test_context());
        assert!(matches!(result, Err(ReportError::EmptyDataset)));
    }

    #[test]
    fn page_count_boundaries() {
        assert_eq!(count_pages(1, 20, 30), 1);
        assert_eq!(count_pages(20, 20, 30), 1);
        assert_eq!(count_pages(21, 20, 30), 2);
        assert_eq!(count_pages(50, 20, 30), 2);
        assert_eq!(count_pages(51, 20, 30), 3);
    }

    #[test]
    fn row_capacity_from_geometry() {
        // Continuation pages start at a fixed y, so capacity is stable
        let cont = rows_that_fit(continuation_table_y());
        assert!(cont > 30);
        // The first page loses capacity to the banner and info block
        let first = rows_that_fit(info_block_bottom(5));
        assert!(first < cont);
    }
}
