//! End-to-end render tests: feed JSON in, finished documents out.
//!
//! These exercise the full pipeline the CLI uses: normalize a feed, fold the
//! projection, and run every backend over the same dataset.

use chrono::NaiveDate;
use spurtrack_core::{ReportContext, ReportRenderer};
use spurtrack_render::{
    CsvRenderer, ExcelRenderer, PdfRenderer, SvgTimelineRenderer, TextRenderer,
};

const FEED: &str = r#"{
    "version": 1,
    "packages": [{
        "id": "NBC-04",
        "work_name": "Nohar Branch Canal, Reach 2",
        "contractor": "M/s Verma Constructions",
        "division": "Hanumangarh Division",
        "rd_start": 10.0,
        "rd_end": 20.0
    }],
    "units": [
        {"id": "spur-7", "name": "Spur at RD 12.400", "kind": "spur",
         "target_length": 0.5, "chainage": 12.4, "package_id": "NBC-04"},
        {"id": "seg-2", "name": "Km 15-16 lining", "kind": "segment",
         "target_length": 1.0, "chainage": 15.0, "package_id": "NBC-04"},
        {"id": "spur-9", "name": "Spur at RD 18.200", "kind": "spur",
         "target_length": 0.2, "chainage": 18.2, "package_id": "NBC-04"}
    ],
    "entries": [
        {"unit_id": "spur-7", "completed": 0.2, "date": "2024-01-10"},
        {"unit_id": "spur-7", "completed": 0.3, "date": "2024-02-10"},
        {"unit_id": "seg-2", "completed": 0.55, "date": "2024-02-20", "status": "in progress"},
        {"unit_id": "spur-9", "completed": 0.0, "date": "2024-01-05", "status": "not started"}
    ]
}"#;

fn context() -> ReportContext {
    ReportContext::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).generated_by("xen-hmh")
}

#[test]
fn csv_covers_every_unit() {
    let dataset = spurtrack_feed::parse_feed(FEED).unwrap();
    let csv = CsvRenderer::new().render(&dataset, &context()).unwrap();

    assert_eq!(csv.lines().count(), 4); // header + 3 units
    assert!(csv.contains("spur-7"));
    assert!(csv.contains("seg-2"));
    assert!(csv.contains("spur-9"));
    // spur-7: 0.2 + 0.3 of 0.5 km target
    assert!(csv.contains("100.00"));
    assert!(csv.contains("Completed"));
}

#[test]
fn excel_workbook_is_a_zip() {
    let dataset = spurtrack_feed::parse_feed(FEED).unwrap();
    let bytes = ExcelRenderer::new().render(&dataset, &context()).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn pdf_document_has_magic_header() {
    let dataset = spurtrack_feed::parse_feed(FEED).unwrap();
    let bytes = PdfRenderer::new().render(&dataset, &context()).unwrap();
    assert_eq!(&bytes[..5], b"%PDF-");
}

#[test]
fn svg_places_units_inside_package_window() {
    let dataset = spurtrack_feed::parse_feed(FEED).unwrap();
    let svg = SvgTimelineRenderer::new().render(&dataset, &context()).unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Spur at RD 12.400"));
    assert!(svg.contains("km 10.0"));
    assert!(svg.contains("km 20.0"));
}

#[test]
fn text_report_summarizes_fleet() {
    let dataset = spurtrack_feed::parse_feed(FEED).unwrap();
    let text = TextRenderer.render(&dataset, &context()).unwrap();

    assert!(text.contains("Nohar Branch Canal, Reach 2"));
    assert!(text.contains("Units: 3"));
    assert!(text.contains("Completed: 1"));
    assert!(text.contains("In Progress: 1"));
    assert!(text.contains("Not Started: 1"));
    // Fleet: (0.5 + 0.55 + 0.0) / (0.5 + 1.0 + 0.2) = 61.8%
    assert!(text.contains("61.8%"));
}

#[test]
fn all_backends_reject_an_empty_dataset() {
    let dataset = spurtrack_feed::parse_feed(r#"{"version": 1}"#).unwrap();
    let context = context();

    assert!(CsvRenderer::new().render(&dataset, &context).is_err());
    assert!(ExcelRenderer::new().render(&dataset, &context).is_err());
    assert!(PdfRenderer::new().render(&dataset, &context).is_err());
    assert!(SvgTimelineRenderer::new().render(&dataset, &context).is_err());
    assert!(TextRenderer.render(&dataset, &context).is_err());
}
