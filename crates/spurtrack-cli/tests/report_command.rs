//! E2E tests for the report command across every output format.

use std::path::Path;
use std::process::Command;

const FEED: &str = r#"{
    "version": 1,
    "packages": [{
        "id": "NBC-04", "work_name": "Nohar Branch Canal, Reach 2",
        "contractor": "M/s Verma Constructions", "rd_start": 10.0, "rd_end": 20.0
    }],
    "units": [
        {"id": "spur-7", "name": "Spur at RD 12.400", "target_length": 0.5,
         "chainage": 12.4, "package_id": "NBC-04"},
        {"id": "seg-2", "kind": "segment", "target_length": 1.0,
         "chainage": 15.0, "package_id": "NBC-04"}
    ],
    "entries": [
        {"unit_id": "spur-7", "completed": 0.4, "date": "2024-02-10"},
        {"unit_id": "seg-2", "completed": 0.3, "date": "2024-03-01"}
    ]
}"#;

fn write_feed(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("feed.json");
    std::fs::write(&path, FEED).unwrap();
    path
}

/// Run report and return (exit_code, stdout, stderr)
fn run_report(feed: &Path, args: &[&str]) -> (i32, String, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_spurtrack"));
    cmd.arg("report")
        .arg(feed)
        .arg("--date")
        .arg("2024-06-01")
        .arg("--user")
        .arg("xen-hmh");
    for arg in args {
        cmd.arg(arg);
    }

    let output = cmd.output().expect("failed to execute spurtrack");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn text_report_goes_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());

    let (code, stdout, _) = run_report(&feed, &["--format", "text"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Nohar Branch Canal, Reach 2"));
    assert!(stdout.contains("Generated by: xen-hmh"));
}

#[test]
fn csv_report_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());
    let out = dir.path().join("progress.csv");

    let (code, stdout, _) =
        run_report(&feed, &["--format", "csv", "--output", out.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Wrote"));

    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("unit_id,"));
    assert!(csv.contains("spur-7"));
}

#[test]
fn svg_report_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());
    let out = dir.path().join("timeline.svg");

    let (code, _, _) =
        run_report(&feed, &["--format", "svg", "--output", out.to_str().unwrap()]);
    assert_eq!(code, 0);

    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Spur at RD 12.400"));
}

#[test]
fn xlsx_report_writes_zip_container() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());
    let out = dir.path().join("progress.xlsx");

    let (code, _, _) =
        run_report(&feed, &["--format", "xlsx", "--output", out.to_str().unwrap()]);
    assert_eq!(code, 0);

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn pdf_report_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());
    let out = dir.path().join("progress.pdf");

    let (code, _, _) =
        run_report(&feed, &["--format", "pdf", "--output", out.to_str().unwrap()]);
    assert_eq!(code, 0);

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(&bytes[..5], b"%PDF-");
}

#[test]
fn binary_format_without_output_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());

    let (code, _, stderr) = run_report(&feed, &["--format", "xlsx"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("pass --output"), "{stderr}");
}

#[test]
fn empty_feed_reports_empty_dataset_error() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("empty.json");
    std::fs::write(&feed, r#"{"version": 1}"#).unwrap();

    let (code, _, stderr) = run_report(&feed, &["--format", "csv"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no progress data"), "{stderr}");
}
