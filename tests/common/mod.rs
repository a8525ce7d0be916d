//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const DATA_MODEL_JSON: &str = r#"{"name":"model","tables":[]}"#;
pub const LAYOUT_JSON: &str = r#"{"id":0,"sections":[]}"#;
pub const ORIGINAL_IMAGE: &[u8] = b"\x89PNG original";

/// Encode text as UTF-16-LE with a BOM, the way PowerBI stores its embedded
/// documents.
pub fn utf16_bytes(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}

/// Write a miniature `.pbit` template archive at `path`.
pub fn write_template(path: &Path) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    writer.start_file("DataModelSchema", options).unwrap();
    writer.write_all(&utf16_bytes(DATA_MODEL_JSON)).unwrap();

    writer.start_file("Report/Layout", options).unwrap();
    writer.write_all(&utf16_bytes(LAYOUT_JSON)).unwrap();

    writer.start_file("SecurityBindings", options).unwrap();
    writer.write_all(b"bindings").unwrap();

    writer
        .start_file(
            "Report/StaticResources/RegisteredResources/logo.png",
            options,
        )
        .unwrap();
    writer.write_all(ORIGINAL_IMAGE).unwrap();

    writer.finish().unwrap();
}

/// Lay out a complete project directory: inventory, tasks, and template.
pub fn write_project(dir: &Path, inventory_yaml: &str, tasks_yaml: &str) {
    std::fs::write(dir.join("inventory.yaml"), inventory_yaml).unwrap();
    std::fs::write(dir.join("tasks.yaml"), tasks_yaml).unwrap();
    write_template(&dir.join("dashboard_template.pbit"));
}

/// Read one entry out of a produced `.pbit` archive.
pub fn read_archive_entry(archive_path: &Path, entry_name: &str) -> Vec<u8> {
    let file = File::open(archive_path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(entry_name).unwrap();
    let mut bytes = Vec::new();
    std::io::Read::read_to_end(&mut entry, &mut bytes).unwrap();
    bytes
}
