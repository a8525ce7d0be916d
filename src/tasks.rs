//! Task model: declarative definitions, rendered instances, and results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

/// Per-task error policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// A failing nugget aborts the whole run (the default).
    #[default]
    Fail,
    /// A failing nugget records a `failed` result and the run continues.
    Ignore,
}

/// A `when` clause.
///
/// A literal boolean bypasses templating and evaluation entirely; an
/// expression string is rendered and then evaluated per iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// A literal boolean
    Literal(bool),
    /// A templated expression string
    Expression(String),
}

/// One declarative task, as parsed from the tasks file.
///
/// Definitions are never mutated after parse; the task generator renders
/// concrete instances from them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDefinition {
    /// Human-readable task name (templated)
    pub name: String,
    /// Dotted nugget identifier, e.g. `builtins.debug` (templated)
    pub nugget: String,
    /// Nugget parameters (values templated, keys untouched)
    #[serde(default)]
    pub params: Option<IndexMap<String, YamlValue>>,
    /// Templated expression expanding to a literal sequence
    #[serde(default, rename = "loop")]
    pub loop_: Option<String>,
    /// Context key the current loop item is bound to
    #[serde(default = "default_loop_key")]
    pub loop_key: String,
    /// Conditional guard; absent means always run
    #[serde(default)]
    pub when: Option<Condition>,
    /// Name under which the result payload is captured
    #[serde(default)]
    pub register: Option<String>,
    /// Error policy for this task
    #[serde(default)]
    pub on_error: OnError,
}

fn default_loop_key() -> String {
    "item".to_string()
}

/// The ordered task list. The tasks file is a top-level YAML sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    /// Tasks in declaration order
    pub tasks: Vec<TaskDefinition>,
}

/// A concrete, fully substituted task instance for one context.
///
/// Produced by the task generator and consumed immediately by the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTask {
    /// Rendered task name
    pub name: String,
    /// Rendered nugget identifier
    pub nugget: String,
    /// Rendered parameters
    pub params: IndexMap<String, YamlValue>,
    /// Resolved conditional
    pub when: bool,
    /// Rendered capture name
    pub register: Option<String>,
    /// Error policy, copied from the definition
    pub on_error: OnError,
}

/// Outcome of one task instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// The nugget ran and succeeded
    Success,
    /// The nugget failed but the task's policy tolerated it
    Failed,
    /// The task's condition was false; the nugget was never built
    Skipped,
}

/// One entry in the run ledger.
///
/// Every task instance appends exactly one result, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Outcome of the task instance
    pub status: ExecutionStatus,
    /// Structured payload returned by the nugget, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<YamlValue>,
}

impl ExecutionResult {
    /// Create a successful result with an optional payload.
    pub fn success(payload: Option<YamlValue>) -> Self {
        Self {
            status: ExecutionStatus::Success,
            payload,
        }
    }

    /// Create a policy-tolerated failure result.
    pub fn failed() -> Self {
        Self {
            status: ExecutionStatus::Failed,
            payload: None,
        }
    }

    /// Create a skipped result.
    pub fn skipped() -> Self {
        Self {
            status: ExecutionStatus::Skipped,
            payload: None,
        }
    }
}
