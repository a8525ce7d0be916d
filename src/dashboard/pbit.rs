//! Open, stage, and persist PowerBI template (`.pbit`) containers.
//!
//! A `.pbit` file is a zip archive embedding two JSON documents encoded as
//! UTF-16-LE: `DataModelSchema` and `Report/Layout`. The template is unpacked
//! once into a temporary directory and its documents parsed once; each target
//! then gets an independent copy of both the tree and the documents. Closing
//! a handle writes the mutated documents back, rezips the tree next to the
//! template, and renames the archive to `<name>.pbit`.
//!
//! All temporary state lives under a single [`TempDir`], so it is reclaimed
//! when the template is dropped, including on abort paths.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::dashboard::Dashboard;
use crate::error::{Error, Result};

const DATA_MODEL: &str = "DataModelSchema";
const LAYOUT: &str = "Report/Layout";
const SECURITY_BINDINGS: &str = "SecurityBindings";
const PBIT_EXTENSION: &str = "pbit";
const UTF16_BOM: [u8; 2] = [0xFF, 0xFE];

/// An unpacked `.pbit` template, ready to stage per-target working copies.
pub struct PbitTemplate {
    temp_dir: TempDir,
    unpacked: PathBuf,
    destination: PathBuf,
    data_model: JsonValue,
    layout: JsonValue,
}

impl PbitTemplate {
    /// Unpack a template archive and parse its embedded documents.
    ///
    /// Finished dashboards are persisted into the template's parent
    /// directory.
    pub fn open(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(PBIT_EXTENSION) => {}
            _ => {
                return Err(Error::container(
                    path,
                    "the dashboard template must be a '.pbit' file",
                ))
            }
        }

        let temp_dir = TempDir::new()
            .map_err(|err| Error::container(path, format!("failed to create work area: {err}")))?;
        let unpacked = temp_dir.path().join("src");

        let file = File::open(path)
            .map_err(|err| Error::container(path, format!("failed to open template: {err}")))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|err| Error::container(path, format!("not a valid zip archive: {err}")))?;
        archive
            .extract(&unpacked)
            .map_err(|err| Error::container(path, format!("failed to unpack template: {err}")))?;

        // PowerBI rejects templates whose security bindings no longer match
        // the edited content, so the bindings file is dropped up front.
        let bindings = unpacked.join(SECURITY_BINDINGS);
        if bindings.exists() {
            fs::remove_file(&bindings)?;
        }

        let data_model = read_utf16_json(&unpacked.join(DATA_MODEL))?;
        let layout = read_utf16_json(&unpacked.join(LAYOUT))?;
        let destination = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        debug!(template = %path.display(), "template unpacked");

        Ok(Self {
            temp_dir,
            unpacked,
            destination,
            data_model,
            layout,
        })
    }

    /// Stage an independent working copy for one dashboard.
    pub fn stage(&self, dashboard_name: &str) -> Result<DashboardHandle> {
        let working = self.temp_dir.path().join(dashboard_name);
        copy_tree(&self.unpacked, &working)?;
        debug!(dashboard = %dashboard_name, "working copy staged");

        Ok(DashboardHandle {
            name: dashboard_name.to_string(),
            dashboard: Dashboard {
                path: working,
                data_model: self.data_model.clone(),
                layout: self.layout.clone(),
            },
            destination: self.destination.clone(),
        })
    }
}

/// A staged working copy with its closing contract.
pub struct DashboardHandle {
    name: String,
    /// The mutable working copy handed to nuggets
    pub dashboard: Dashboard,
    destination: PathBuf,
}

impl DashboardHandle {
    /// Persist the working copy as `<name>.pbit` next to the template.
    ///
    /// The archive is packed under a scratch name first; the final file name
    /// only ever appears through a rename.
    pub fn close(self) -> Result<PathBuf> {
        write_utf16_json(&self.dashboard.path.join(DATA_MODEL), &self.dashboard.data_model)?;
        write_utf16_json(&self.dashboard.path.join(LAYOUT), &self.dashboard.layout)?;

        let scratch = self.destination.join(format!("{}.pbit.part", self.name));
        pack_tree(&self.dashboard.path, &scratch)?;
        let target = self.destination.join(format!("{}.pbit", self.name));
        fs::rename(&scratch, &target).map_err(|err| {
            Error::container(&target, format!("failed to move finished dashboard: {err}"))
        })?;
        debug!(dashboard = %self.name, path = %target.display(), "dashboard persisted");
        Ok(target)
    }
}

fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry
            .map_err(|err| Error::container(src, format!("failed to walk template tree: {err}")))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| Error::container(entry.path(), err.to_string()))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn pack_tree(root: &Path, archive_path: &Path) -> Result<()> {
    let file = File::create(archive_path).map_err(|err| {
        Error::container(archive_path, format!("failed to create archive: {err}"))
    })?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for entry in WalkDir::new(root) {
        let entry = entry
            .map_err(|err| Error::container(root, format!("failed to walk working tree: {err}")))?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|err| Error::container(entry.path(), err.to_string()))?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        // Zip entry names always use forward slashes.
        let entry_name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            writer.add_directory(entry_name, options).map_err(|err| {
                Error::container(archive_path, format!("failed to add directory: {err}"))
            })?;
        } else {
            writer.start_file(entry_name, options).map_err(|err| {
                Error::container(archive_path, format!("failed to add file: {err}"))
            })?;
            let mut source = File::open(entry.path())?;
            std::io::copy(&mut source, &mut writer)?;
        }
    }

    writer
        .finish()
        .map_err(|err| Error::container(archive_path, format!("failed to finish archive: {err}")))?;
    Ok(())
}

fn read_utf16_json(path: &Path) -> Result<JsonValue> {
    let bytes = fs::read(path)
        .map_err(|err| Error::container(path, format!("failed to read document: {err}")))?;
    let body = bytes.strip_prefix(&UTF16_BOM).unwrap_or(&bytes);
    if body.len() % 2 != 0 {
        return Err(Error::container(path, "truncated UTF-16 payload"));
    }
    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let text = String::from_utf16(&units)
        .map_err(|err| Error::container(path, format!("invalid UTF-16 payload: {err}")))?;
    serde_json::from_str(&text)
        .map_err(|err| Error::container(path, format!("invalid JSON payload: {err}")))
}

fn write_utf16_json(path: &Path, payload: &JsonValue) -> Result<()> {
    let text = serde_json::to_string(payload)?;
    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    bytes.extend_from_slice(&UTF16_BOM);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(path, bytes)
        .map_err(|err| Error::container(path, format!("failed to write document: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc");
        let payload: JsonValue = serde_json::json!({"name": "modèle", "tables": [1, 2]});

        write_utf16_json(&path, &payload).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &UTF16_BOM);

        let read_back = read_utf16_json(&path).unwrap();
        assert_eq!(read_back, payload);
    }

    #[test]
    fn test_read_utf16_json_without_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc");
        let text = r#"{"a":1}"#;
        let mut bytes = Vec::new();
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(&path, bytes).unwrap();

        let read_back = read_utf16_json(&path).unwrap();
        assert_eq!(read_back, serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_open_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.zip");
        fs::write(&path, b"not a pbit").unwrap();
        let result = PbitTemplate::open(&path);
        assert!(matches!(result, Err(Error::Container { .. })));
    }

    #[test]
    fn test_open_rejects_invalid_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.pbit");
        fs::write(&path, b"definitely not a zip").unwrap();
        let result = PbitTemplate::open(&path);
        assert!(matches!(result, Err(Error::Container { .. })));
    }
}
