//! Nugget system: the pluggable units of work applied to a staged dashboard.
//!
//! Nuggets are resolved through an explicit registry keyed by dotted
//! identifier (`builtins.debug`) and populated with the built-in set at
//! process start. Unknown identifiers are rejected deterministically; there
//! is no dynamic lookup.

pub mod debug;
pub mod replace_image;

use indexmap::IndexMap;
use serde_yaml::Value as YamlValue;
use std::collections::HashMap;
use thiserror::Error;

use crate::dashboard::Dashboard;

/// Errors surfaced by nugget resolution, construction, and execution.
///
/// These are the only errors governed by a task's `on_error` policy; the
/// executor wraps them with the nugget and dashboard identifiers when a run
/// aborts.
#[derive(Error, Debug)]
pub enum NuggetError {
    #[error("nugget not found: {0}")]
    NotFound(String),

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("invalid parameter '{key}': {message}")]
    InvalidParameter { key: String, message: String },

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for nugget operations.
pub type NuggetResult<T> = Result<T, NuggetError>;

/// Parameters passed to a nugget factory, already rendered.
pub type NuggetParams = IndexMap<String, YamlValue>;

/// A single unit of work applied to one dashboard's working copy.
pub trait Nugget {
    /// The friendly name of the nugget.
    fn name(&self) -> &'static str;

    /// Execute against the staged dashboard, returning an optional payload.
    fn run(&self, dashboard: &mut Dashboard) -> NuggetResult<Option<YamlValue>>;
}

/// Builds a nugget from resolved task parameters.
pub type NuggetFactory = fn(&NuggetParams) -> NuggetResult<Box<dyn Nugget>>;

/// Registry mapping dotted identifiers to nugget factories.
pub struct NuggetRegistry {
    factories: HashMap<String, NuggetFactory>,
}

impl NuggetRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with all built-in nuggets.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("builtins.debug", debug::DebugNugget::from_params);
        registry.register(
            "builtins.replace_image",
            replace_image::ReplaceImageNugget::from_params,
        );
        registry
    }

    /// Register a factory under a dotted identifier.
    pub fn register(&mut self, identifier: impl Into<String>, factory: NuggetFactory) {
        self.factories.insert(identifier.into(), factory);
    }

    /// Resolve an identifier to its factory.
    pub fn resolve(&self, identifier: &str) -> NuggetResult<NuggetFactory> {
        self.factories
            .get(identifier)
            .copied()
            .ok_or_else(|| NuggetError::NotFound(identifier.to_string()))
    }

    /// Check if an identifier is registered.
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// All registered identifiers.
    pub fn identifiers(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for NuggetRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Helper trait for extracting typed parameters.
pub trait ParamExt {
    fn get_str(&self, key: &str) -> NuggetResult<Option<String>>;
    fn get_str_required(&self, key: &str) -> NuggetResult<String>;
}

impl ParamExt for NuggetParams {
    fn get_str(&self, key: &str) -> NuggetResult<Option<String>> {
        match self.get(key) {
            Some(YamlValue::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(NuggetError::InvalidParameter {
                key: key.to_string(),
                message: "must be a string".to_string(),
            }),
            None => Ok(None),
        }
    }

    fn get_str_required(&self, key: &str) -> NuggetResult<String> {
        self.get_str(key)?
            .ok_or_else(|| NuggetError::MissingParameter(key.to_string()))
    }
}
