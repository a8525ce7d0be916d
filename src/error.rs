//! Error types for Dashforge.
//!
//! A single closed enum covers the whole taxonomy: input parsing, templating,
//! loop expansion, nugget resolution and execution, and container handling.
//! Only nugget resolution and execution failures are governed by a task's
//! `on_error` policy; every other kind aborts the run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Dashforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Dashforge.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Input File Errors
    // ========================================================================
    /// Error reading or parsing one of the declarative input files.
    #[error("Failed to parse '{path}': {message}")]
    InputParse {
        /// Path to the offending file
        path: PathBuf,
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ========================================================================
    // Templating Errors
    // ========================================================================
    /// A value of an unsupported type was handed to the renderer.
    #[error("Templating failed: {0}")]
    Templating(String),

    /// Template syntax or rendering error.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A loop expression did not render to a literal sequence.
    #[error("Loop expression for task '{task}' did not produce a sequence: {message}")]
    LoopExpansion {
        /// Name of the task whose loop failed to expand
        task: String,
        /// Error message
        message: String,
    },

    // ========================================================================
    // Nugget Errors
    // ========================================================================
    /// The nugget identifier is not registered.
    #[error("Nugget '{0}' not found in the builtins registry")]
    NuggetNotFound(String),

    /// A nugget failed while being built or executed.
    #[error("Nugget '{nugget}' failed for dashboard '{dashboard}': {message}")]
    NuggetExecution {
        /// The nugget identifier
        nugget: String,
        /// The dashboard being processed
        dashboard: String,
        /// Error message
        message: String,
        /// Source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ========================================================================
    // Container Errors
    // ========================================================================
    /// The `.pbit` container could not be opened, staged, or persisted.
    #[error("Container error for '{path}': {message}")]
    Container {
        /// The container or working-tree path involved
        path: PathBuf,
        /// Error message
        message: String,
    },

    // ========================================================================
    // IO and Serialization Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new input parse error.
    pub fn input_parse(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::InputParse {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Creates a new container error.
    pub fn container(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Container {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wraps a nugget failure with the nugget and dashboard identifiers.
    pub fn nugget_execution(
        nugget: impl Into<String>,
        dashboard: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::NuggetExecution {
            nugget: nugget.into(),
            dashboard: dashboard.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NuggetNotFound(_) | Error::NuggetExecution { .. } => 2,
            Error::InputParse { .. } | Error::Yaml(_) | Error::Json(_) => 4,
            Error::Container { .. } => 5,
            Error::Templating(_) | Error::Template(_) | Error::LoopExpansion { .. } => 6,
            _ => 1,
        }
    }
}
