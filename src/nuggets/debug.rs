//! Debug nugget: logs a message and returns it as the result payload.

use serde_yaml::Value as YamlValue;
use tracing::info;

use super::{Nugget, NuggetParams, NuggetResult, ParamExt};
use crate::dashboard::Dashboard;

/// Echoes a rendered message. Useful for tracing a run and for capturing
/// rendered values into the ledger.
pub struct DebugNugget {
    msg: String,
}

impl DebugNugget {
    /// Factory entry point for the registry.
    pub fn from_params(params: &NuggetParams) -> NuggetResult<Box<dyn Nugget>> {
        Ok(Box::new(Self {
            msg: params.get_str_required("msg")?,
        }))
    }
}

impl Nugget for DebugNugget {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn run(&self, _dashboard: &mut Dashboard) -> NuggetResult<Option<YamlValue>> {
        info!(nugget = self.name(), "{}", self.msg);
        Ok(Some(YamlValue::String(self.msg.clone())))
    }
}
