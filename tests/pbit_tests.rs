//! Container manager: unpacking, staging independent working copies, and
//! persisting finished archives.

mod common;

use dashforge::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_stage_and_close_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("dashboard_template.pbit");
    common::write_template(&template_path);

    let template = PbitTemplate::open(&template_path).unwrap();
    let handle = template.stage("d1").unwrap();
    let output = handle.close().unwrap();

    assert_eq!(output, dir.path().join("d1.pbit"));
    let layout = common::read_archive_entry(&output, "Report/Layout");
    // The document survives the decode/encode cycle as UTF-16-LE JSON.
    assert_eq!(&layout[..2], &[0xFF, 0xFE]);
    let resource = common::read_archive_entry(
        &output,
        "Report/StaticResources/RegisteredResources/logo.png",
    );
    assert_eq!(resource, common::ORIGINAL_IMAGE);
}

#[test]
fn test_document_edits_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("dashboard_template.pbit");
    common::write_template(&template_path);

    let template = PbitTemplate::open(&template_path).unwrap();
    let mut handle = template.stage("d1").unwrap();
    handle.dashboard.data_model["name"] = serde_json::json!("customized");
    let output = handle.close().unwrap();

    let bytes = common::read_archive_entry(&output, "DataModelSchema");
    let body = &bytes[2..];
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units).unwrap();
    let document: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(document["name"], serde_json::json!("customized"));
}

#[test]
fn test_staged_copies_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("dashboard_template.pbit");
    common::write_template(&template_path);

    let template = PbitTemplate::open(&template_path).unwrap();
    let mut first = template.stage("d1").unwrap();
    let second = template.stage("d2").unwrap();

    // Mutating one working copy must not leak into the other.
    first.dashboard.data_model["name"] = serde_json::json!("first only");
    std::fs::write(
        first
            .dashboard
            .path
            .join("Report/StaticResources/RegisteredResources/logo.png"),
        b"mutated",
    )
    .unwrap();

    assert_eq!(second.dashboard.data_model["name"], serde_json::json!("model"));
    let untouched = std::fs::read(
        second
            .dashboard
            .path
            .join("Report/StaticResources/RegisteredResources/logo.png"),
    )
    .unwrap();
    assert_eq!(untouched, common::ORIGINAL_IMAGE);
}
