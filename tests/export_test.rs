//! Writing results to disk in both export formats.

mod common;

use std::fs;

use tempfile::TempDir;

use common::harness;
use oncodemo::application::services::ExportFormat;
use oncodemo::domain::{EventLevel, FormInput, PipelineOutput};

#[test]
fn given_results_when_exporting_json_then_file_parses_back() {
    let temp = TempDir::new().unwrap();
    let h = harness(temp.path(), None);
    let output = h
        .container
        .training_service()
        .process(&FormInput::preset())
        .unwrap();
    let out_dir = temp.path().join("out");

    let path = h
        .container
        .export_service()
        .export(&output, ExportFormat::Json, &out_dir)
        .unwrap();

    assert_eq!(path, out_dir.join("model_results.json"));
    let parsed: PipelineOutput = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, output);
    let events = h.sink.events.lock().unwrap();
    let last = events.last().unwrap();
    assert_eq!(last.level, EventLevel::Success);
    assert_eq!(last.message, "Download ready: model_results.json");
}

#[test]
fn given_results_when_exporting_csv_then_header_and_one_row() {
    let temp = TempDir::new().unwrap();
    let h = harness(temp.path(), None);
    let output = h
        .container
        .training_service()
        .process(&FormInput::preset())
        .unwrap();

    let path = h
        .container
        .export_service()
        .export(&output, ExportFormat::Csv, temp.path())
        .unwrap();

    let body = fs::read_to_string(path).unwrap();
    let lines: Vec<_> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("accuracy,precision,recall,f1Score"));
    assert!(lines[1].starts_with("95.6,"));
}

#[test]
fn given_unwritable_target_when_exporting_then_reports_failure() {
    let temp = TempDir::new().unwrap();
    let h = harness(temp.path(), None);
    let output = h
        .container
        .training_service()
        .process(&FormInput::preset())
        .unwrap();
    // a regular file where the output directory should be
    let blocker = temp.path().join("blocked");
    fs::write(&blocker, "").unwrap();

    let result = h
        .container
        .export_service()
        .export(&output, ExportFormat::Json, &blocker);

    assert!(result.is_err());
    let events = h.sink.events.lock().unwrap();
    assert!(events
        .last()
        .unwrap()
        .message
        .starts_with("Download failed:"));
}
