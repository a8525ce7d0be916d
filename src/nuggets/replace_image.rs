//! Replace-image nugget: swaps an embedded report image for a local file.

use std::path::PathBuf;

use serde_yaml::Value as YamlValue;
use tracing::debug;

use super::{Nugget, NuggetError, NuggetParams, NuggetResult, ParamExt};
use crate::dashboard::Dashboard;

/// Where PowerBI report templates keep their registered static resources.
const REGISTERED_RESOURCES: &str = "Report/StaticResources/RegisteredResources";

/// Replaces the registered resource `source_name` in the staged dashboard
/// with the image file at `target_path`.
pub struct ReplaceImageNugget {
    source_name: String,
    target_path: PathBuf,
}

impl ReplaceImageNugget {
    /// Factory entry point for the registry.
    pub fn from_params(params: &NuggetParams) -> NuggetResult<Box<dyn Nugget>> {
        Ok(Box::new(Self {
            source_name: params.get_str_required("source_name")?,
            target_path: PathBuf::from(params.get_str_required("target_path")?),
        }))
    }
}

impl Nugget for ReplaceImageNugget {
    fn name(&self) -> &'static str {
        "replace_image"
    }

    fn run(&self, dashboard: &mut Dashboard) -> NuggetResult<Option<YamlValue>> {
        let destination = dashboard
            .path
            .join(REGISTERED_RESOURCES)
            .join(&self.source_name);
        if !destination.exists() {
            return Err(NuggetError::ExecutionFailed(format!(
                "resource '{}' does not exist in the dashboard template",
                self.source_name
            )));
        }
        if !self.target_path.exists() {
            return Err(NuggetError::ExecutionFailed(format!(
                "replacement image '{}' does not exist",
                self.target_path.display()
            )));
        }

        std::fs::copy(&self.target_path, &destination)?;
        debug!(
            nugget = self.name(),
            source = %self.source_name,
            target = %self.target_path.display(),
            "image replaced"
        );
        Ok(None)
    }
}
