//! # spurtrack-render
//!
//! Report backends for spurtrack progress datasets.
//!
//! This crate provides:
//! - SVG chainage timeline rendering
//! - Excel progress reports (multi-sheet, styled)
//! - PDF progress reports (A4, paginated, inline progress bars)
//! - CSV export
//! - Text output for terminals
//!
//! ## Example
//!
//! ```rust,ignore
//! use spurtrack_core::{ReportContext, ReportRenderer};
//! use spurtrack_render::{CsvRenderer, ExcelRenderer, PdfRenderer, SvgTimelineRenderer};
//!
//! // CSV summary table
//! let csv = CsvRenderer::new().render(&dataset, &context)?;
//!
//! // Styled multi-sheet workbook
//! let xlsx_bytes = ExcelRenderer::new().render(&dataset, &context)?;
//! std::fs::write("progress.xlsx", xlsx_bytes)?;
//!
//! // Paginated A4 report
//! let pdf_bytes = PdfRenderer::new().render(&dataset, &context)?;
//!
//! // Chainage timeline
//! let svg = SvgTimelineRenderer::new().render(&dataset, &context)?;
//! ```
//!
//! Every backend recomputes the cumulative projection from the dataset it is
//! handed; a report run is one synchronous operation that completes or fails
//! without leaving partial output behind.

pub mod csv;
pub mod excel;
pub mod pdf;

pub use crate::csv::{report_filename, CsvRenderer};
pub use crate::excel::ExcelRenderer;
pub use crate::pdf::PdfRenderer;

use svg::node::element::{Circle, Group, Line, Rectangle, Text};
use svg::Document;

use spurtrack_core::{
    ChainageWindow, Dataset, ReportContext, ReportError, ReportRenderer, UnitProgress, WorkStatus,
};

// ============================================================================
// Shared percent tiers
// ============================================================================

/// Color tier for a completion percentage.
///
/// The thresholds are the single source of truth for every backend, so the
/// Excel and PDF color coding cannot drift apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PercentTier {
    /// >= 80%
    High,
    /// 50-79%
    Mid,
    /// < 50%
    Low,
}

/// Classify a completion percentage into its display tier
pub fn percent_tier(percent: f64) -> PercentTier {
    if percent >= 80.0 {
        PercentTier::High
    } else if percent >= 50.0 {
        PercentTier::Mid
    } else {
        PercentTier::Low
    }
}

impl PercentTier {
    /// RGB color as a packed integer (Excel format)
    pub fn rgb(&self) -> u32 {
        match self {
            PercentTier::High => 0x2E7D32,
            PercentTier::Mid => 0xF9A825,
            PercentTier::Low => 0xC62828,
        }
    }

    /// CSS hex string (SVG format)
    pub fn css(&self) -> &'static str {
        match self {
            PercentTier::High => "#2e7d32",
            PercentTier::Mid => "#f9a825",
            PercentTier::Low => "#c62828",
        }
    }

    /// Normalized RGB components (PDF format)
    pub fn rgb_f64(&self) -> (f64, f64, f64) {
        let packed = self.rgb();
        (
            f64::from((packed >> 16) & 0xFF) / 255.0,
            f64::from((packed >> 8) & 0xFF) / 255.0,
            f64::from(packed & 0xFF) / 255.0,
        )
    }
}

/// Marker color for a unit status on the timeline
pub fn status_color(status: WorkStatus) -> &'static str {
    match status {
        WorkStatus::Completed => "#2e7d32",
        WorkStatus::InProgress => "#1565c0",
        WorkStatus::NotStarted => "#9e9e9e",
    }
}

/// Truncate a string to a maximum length with ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}

/// Pick the chainage window to render: an explicit override, the first
/// package that declares one, or the span of the units' chainage markers.
fn resolve_window(dataset: &Dataset, explicit: Option<ChainageWindow>) -> Option<ChainageWindow> {
    if explicit.is_some() {
        return explicit;
    }
    if let Some(window) = dataset.packages.iter().find_map(|p| p.window) {
        return Some(window);
    }
    let markers: Vec<f64> = dataset.units.iter().filter_map(|u| u.chainage).collect();
    let lo = markers.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = markers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() && hi.is_finite() {
        Some(ChainageWindow::new(lo, hi))
    } else {
        None
    }
}

/// Heading for a report: explicit context override, else the first package's
/// work name, else a generic title.
fn report_heading(dataset: &Dataset, context: &ReportContext) -> String {
    if let Some(heading) = &context.heading {
        return heading.clone();
    }
    dataset
        .packages
        .first()
        .map(|p| p.work_name.clone())
        .unwrap_or_else(|| "Construction Progress Report".to_string())
}

// ============================================================================
// SVG timeline renderer
// ============================================================================

/// SVG chainage timeline renderer configuration
#[derive(Clone, Debug)]
pub struct SvgTimelineRenderer {
    /// Width of the axis area in pixels
    pub axis_width: u32,
    /// Total height in pixels
    pub height: u32,
    /// Padding around the drawing
    pub padding: u32,
    /// Explicit chainage window; derived from the dataset when None
    pub window: Option<ChainageWindow>,
    /// Marker radius in pixels
    pub marker_radius: u32,
    /// Background color
    pub background_color: String,
    /// Axis and tick color
    pub axis_color: String,
    /// Text color
    pub text_color: String,
    /// Font family
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl Default for SvgTimelineRenderer {
    fn default() -> Self {
        Self {
            axis_width: 760,
            height: 220,
            padding: 20,
            window: None,
            marker_radius: 7,
            background_color: "#ffffff".into(),
            axis_color: "#2c3e50".into(),
            text_color: "#2c3e50".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

impl SvgTimelineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the axis width
    pub fn axis_width(mut self, width: u32) -> Self {
        self.axis_width = width;
        self
    }

    /// Fix the chainage window instead of deriving it from the dataset
    pub fn window(mut self, window: ChainageWindow) -> Self {
        self.window = Some(window);
        self
    }

    fn total_width(&self) -> u32 {
        self.padding * 2 + self.axis_width
    }

    /// Convert a normalized 0-100 position to an x pixel coordinate
    fn position_to_x(&self, position: f64) -> f64 {
        f64::from(self.padding) + position / 100.0 * f64::from(self.axis_width)
    }

    fn render_axis(&self, window: ChainageWindow, axis_y: f64) -> Group {
        let mut group = Group::new().set("class", "axis");

        let line = Line::new()
            .set("x1", self.padding)
            .set("y1", axis_y)
            .set("x2", self.padding + self.axis_width)
            .set("y2", axis_y)
            .set("stroke", self.axis_color.as_str())
            .set("stroke-width", 2);
        group = group.add(line);

        // End ticks with km labels
        for (position, km) in [(0.0, window.start), (100.0, window.end)] {
            let x = self.position_to_x(position);
            let tick = Line::new()
                .set("x1", x)
                .set("y1", axis_y - 6.0)
                .set("x2", x)
                .set("y2", axis_y + 6.0)
                .set("stroke", self.axis_color.as_str())
                .set("stroke-width", 2);
            group = group.add(tick);

            let label = Text::new(format!("km {km:.1}"))
                .set("x", x)
                .set("y", axis_y + 22.0)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size)
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "middle");
            group = group.add(label);
        }

        group
    }

    fn render_marker(&self, row: &UnitProgress, window: ChainageWindow, axis_y: f64) -> Group {
        let mut group = Group::new().set("class", "unit");

        let chainage = row.chainage.unwrap_or(window.start);
        let x = self.position_to_x(window.position(chainage));
        let color = status_color(row.status);

        let marker = Circle::new()
            .set("cx", x)
            .set("cy", axis_y)
            .set("r", self.marker_radius)
            .set("fill", color)
            .set("stroke", "#ffffff")
            .set("stroke-width", 1.5);
        group = group.add(marker);

        let label = Text::new(truncate(&row.name, 18))
            .set("x", x)
            .set("y", axis_y - f64::from(self.marker_radius) - 8.0)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size - 1)
            .set("fill", self.text_color.as_str())
            .set("text-anchor", "middle");
        group = group.add(label);

        let percent = Text::new(format!("{:.0}%", row.percent))
            .set("x", x)
            .set("y", axis_y + f64::from(self.marker_radius) + 16.0)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size - 2)
            .set("fill", color)
            .set("text-anchor", "middle");
        group = group.add(percent);

        group
    }

    fn render_legend(&self, y: f64) -> Group {
        let mut group = Group::new().set("class", "legend");
        let entries = [
            (WorkStatus::Completed, 0.0),
            (WorkStatus::InProgress, 120.0),
            (WorkStatus::NotStarted, 240.0),
        ];

        for (status, offset) in entries {
            let x = f64::from(self.padding) + offset;
            let swatch = Rectangle::new()
                .set("x", x)
                .set("y", y - 10.0)
                .set("width", 12)
                .set("height", 12)
                .set("rx", 2)
                .set("fill", status_color(status));
            group = group.add(swatch);

            let label = Text::new(status.as_str())
                .set("x", x + 17.0)
                .set("y", y)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size - 1)
                .set("fill", self.text_color.as_str());
            group = group.add(label);
        }

        group
    }
}

impl ReportRenderer for SvgTimelineRenderer {
    type Output = String;

    fn render(&self, dataset: &Dataset, context: &ReportContext) -> Result<String, ReportError> {
        let progress = dataset.unit_progress();
        if progress.is_empty() {
            return Err(ReportError::EmptyDataset);
        }

        let window = resolve_window(dataset, self.window).ok_or_else(|| {
            ReportError::InvalidData("no chainage window configured and no unit has a chainage".into())
        })?;

        let width = self.total_width();
        let height = self.height;
        let axis_y = f64::from(height) / 2.0;

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", self.background_color.as_str());
        document = document.add(background);

        let title = Text::new(report_heading(dataset, context))
            .set("x", self.padding)
            .set("y", self.padding + 8)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size + 4)
            .set("font-weight", "bold")
            .set("fill", self.text_color.as_str());
        document = document.add(title);

        let subtitle = Text::new(format!("as of {}", context.report_date))
            .set("x", self.padding)
            .set("y", self.padding + 26)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size - 1)
            .set("fill", self.text_color.as_str());
        document = document.add(subtitle);

        document = document.add(self.render_axis(window, axis_y));

        for row in &progress {
            document = document.add(self.render_marker(row, window, axis_y));
        }

        document = document.add(self.render_legend(f64::from(height) - 14.0));

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| ReportError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| ReportError::Format(format!("Invalid UTF-8: {}", e)))
    }
}

// ============================================================================
// Text renderer
// ============================================================================

/// Plain text renderer for terminal output
#[derive(Default)]
pub struct TextRenderer;

fn progress_bar(percent: f64, width: usize) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = (clamped / 100.0 * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

impl ReportRenderer for TextRenderer {
    type Output = String;

    fn render(&self, dataset: &Dataset, context: &ReportContext) -> Result<String, ReportError> {
        let progress = dataset.unit_progress();
        if progress.is_empty() {
            return Err(ReportError::EmptyDataset);
        }
        let summary = spurtrack_core::ProgressSummary::from_progress(&progress);

        let mut out = String::new();
        out.push_str(&format!("{}\n", report_heading(dataset, context)));
        out.push_str(&format!("Report date: {}\n", context.report_date));
        if let Some(user) = &context.generated_by {
            out.push_str(&format!("Generated by: {}\n", user));
        }
        out.push('\n');

        out.push_str(&format!(
            "Progress: {} {:.1}%\n",
            progress_bar(summary.overall_percent, 20),
            summary.overall_percent
        ));
        out.push_str(&format!(
            "Units: {}  Completed: {}  In Progress: {}  Not Started: {}\n",
            summary.total_units,
            summary.completed_units,
            summary.in_progress_units,
            summary.not_started_units
        ));
        out.push_str(&format!(
            "Completed length: {:.2} / {:.2} km\n",
            summary.measured_completed_length, summary.measured_target_length
        ));
        if let Some(date) = summary.latest_report {
            out.push_str(&format!("Last report: {}\n", date));
        }
        out.push('\n');

        let rollups = spurtrack_core::summary::by_package(&progress);
        if rollups.len() > 1 {
            for rollup in &rollups {
                out.push_str(&format!(
                    "{:<14} {} {:>5.1}%  ({} units, {:.2} / {:.2} km)\n",
                    rollup.package_id.as_deref().unwrap_or("(unassigned)"),
                    progress_bar(rollup.percent, 12),
                    rollup.percent,
                    rollup.units,
                    rollup.completed_length,
                    rollup.target_length
                ));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "{:<14} {:<9} {:>8} {:>8} {:>7}  {}\n",
            "UNIT", "KIND", "TARGET", "DONE", "%", "STATUS"
        ));
        for row in &progress {
            let target = row
                .target_length
                .map(|t| format!("{t:.2}"))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "{:<14} {:<9} {:>8} {:>8.2} {:>6.1}%  {}\n",
                truncate(&row.unit_id, 14),
                row.kind.as_str(),
                target,
                row.record.total_completed,
                row.percent,
                row.status
            ));
        }

        Ok(out)
    }
}

// ============================================================================
// Tests
// ============================================================================
