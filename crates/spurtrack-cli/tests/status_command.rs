//! E2E tests for the status command output in both formats.

use std::path::Path;
use std::process::Command;

const FEED: &str = r#"{
    "version": 1,
    "packages": [
        {"id": "NBC-04", "work_name": "Nohar Branch Canal, Reach 2",
         "contractor": "M/s Verma Constructions", "rd_start": 10.0, "rd_end": 20.0},
        {"id": "NBC-05", "work_name": "Nohar Branch Canal, Reach 3"}
    ],
    "units": [
        {"id": "spur-7", "target_length": 0.5, "chainage": 12.4, "package_id": "NBC-04"},
        {"id": "seg-2", "kind": "segment", "target_length": 1.0, "chainage": 15.0, "package_id": "NBC-04"},
        {"id": "spur-31", "target_length": 0.8, "chainage": 24.0, "package_id": "NBC-05"}
    ],
    "entries": [
        {"unit_id": "spur-7", "completed": 0.5, "date": "2024-02-10"},
        {"unit_id": "seg-2", "completed": 0.3, "date": "2024-03-01"},
        {"unit_id": "spur-31", "completed": 0.2, "date": "2024-03-05"}
    ]
}"#;

fn write_feed(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("feed.json");
    std::fs::write(&path, FEED).unwrap();
    path
}

/// Run status and return (exit_code, stdout, stderr)
fn run_status(feed: &Path, args: &[&str]) -> (i32, String, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_spurtrack"));
    cmd.arg("status").arg(feed).arg("--date").arg("2024-06-01");
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
fn text_status_shows_heading_and_progress_bar() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());

    let (code, stdout, _) = run_status(&feed, &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Nohar Branch Canal, Reach 2"));
    assert!(stdout.contains("Report date: 2024-06-01"));
    assert!(stdout.contains("Progress:"));
    assert!(stdout.contains("%"));
}

#[test]
fn text_status_shows_unit_breakdown() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());

    let (code, stdout, _) = run_status(&feed, &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Units: 3"));
    assert!(stdout.contains("Completed: 1"));
    assert!(stdout.contains("In Progress: 2"));
    assert!(stdout.contains("spur-7"));
    assert!(stdout.contains("seg-2"));
}

#[test]
fn json_status_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());

    let (code, stdout, _) = run_status(&feed, &["--format", "json"]);
    assert_eq!(code, 0);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(value["total_units"], 3);
    assert_eq!(value["completed_units"], 1);
    assert_eq!(value["latest_report"], "2024-03-05");
}

#[test]
fn package_filter_restricts_the_fleet() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());

    let (code, stdout, _) = run_status(&feed, &["--package", "NBC-04"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Units: 2"));
    assert!(!stdout.contains("spur-31"));
}

#[test]
fn unknown_package_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let feed = write_feed(dir.path());

    let (code, _, stderr) = run_status(&feed, &["--package", "NBC-99"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("package 'NBC-99' not found"), "{stderr}");
}
