//! Dashboard working copies and the `.pbit` container manager.

mod pbit;

pub use pbit::{DashboardHandle, PbitTemplate};

use serde_json::Value as JsonValue;
use std::path::PathBuf;

/// One target's writable working copy of the template.
///
/// Owned exclusively by the executor for the duration of that target's
/// processing; nuggets mutate the tree under `path` and the two parsed
/// documents, which are written back when the handle is closed.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// Root of the unpacked working tree
    pub path: PathBuf,
    /// The embedded `DataModelSchema` document
    pub data_model: JsonValue,
    /// The embedded `Report/Layout` document
    pub layout: JsonValue,
}
