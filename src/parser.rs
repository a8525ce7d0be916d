//! YAML loading for the declarative input files.
//!
//! Missing files, malformed syntax, and schema mismatches all surface as
//! [`Error::InputParse`](crate::error::Error::InputParse) carrying the
//! offending path. These errors are fatal and abort a run before any target
//! is processed.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{Error, Result};
use crate::inventory::{Inventory, Vars};
use crate::tasks::TaskList;

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        Error::input_parse(path, "failed to read file", Some(Box::new(err)))
    })?;
    serde_yaml::from_str(&content).map_err(|err| {
        let message = err.to_string();
        Error::input_parse(path, message, Some(Box::new(err)))
    })
}

/// Load and validate the inventory file.
pub fn load_inventory(path: &Path) -> Result<Inventory> {
    parse_file(path)
}

/// Load and validate the tasks file (a top-level YAML sequence).
pub fn load_tasks(path: &Path) -> Result<TaskList> {
    parse_file(path)
}

/// Load the extra-variables file.
pub fn load_vars(path: &Path) -> Result<Vars> {
    parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_input_parse() {
        let result = load_inventory(Path::new("/nonexistent/inventory.yaml"));
        assert!(matches!(result, Err(Error::InputParse { .. })));
    }

    #[test]
    fn test_malformed_tasks_is_input_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.yaml");
        std::fs::write(&path, "- name: broken\n  nugget: [not, a, string\n").unwrap();
        let result = load_tasks(&path);
        assert!(matches!(result, Err(Error::InputParse { .. })));
    }

    #[test]
    fn test_schema_mismatch_is_input_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.yaml");
        // A mapping where a sequence of tasks is required.
        std::fs::write(&path, "tasks: nope\n").unwrap();
        let result = load_tasks(&path);
        assert!(matches!(result, Err(Error::InputParse { .. })));
    }
}
