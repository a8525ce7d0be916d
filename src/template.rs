//! Templating evaluator.
//!
//! Renders YAML structures and evaluates conditional expressions against a
//! per-iteration variable context using a Jinja2-compatible engine (minijinja).
//! Undefined variable references render as empty text rather than failing.
//!
//! Condition expressions use minijinja's expression grammar, which is
//! side-effect free: comparisons, boolean connectives, membership tests,
//! arithmetic, and filters. There is no assignment and no I/O, which makes the
//! grammar a safe trust boundary for user-supplied task files.

use indexmap::IndexMap;
use minijinja::{Environment, UndefinedBehavior};
use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};

/// The variable namespace available to one task instance.
///
/// Each loop iteration receives its own clone; values are owned trees, so a
/// clone is a deep copy and iterations can never alias each other's data.
pub type RenderContext = IndexMap<String, YamlValue>;

/// Renders templated values and evaluates conditions.
pub struct Renderer {
    env: Environment<'static>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    /// Create a renderer with a permissive substitution policy.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        Self { env }
    }

    /// Render a template string against the context.
    ///
    /// A template that evaluates to nothing yields an empty string.
    pub fn render_str(&self, template: &str, ctx: &RenderContext) -> Result<String> {
        Ok(self.env.render_str(template, ctx)?)
    }

    /// Render a YAML value against the context.
    ///
    /// Null passes through, strings are substituted, sequences and mappings
    /// are rendered element-wise (mapping keys are never templated). Any
    /// other node type is a data error.
    pub fn render_value(&self, value: &YamlValue, ctx: &RenderContext) -> Result<YamlValue> {
        match value {
            YamlValue::Null => Ok(YamlValue::Null),
            YamlValue::String(s) => Ok(YamlValue::String(self.render_str(s, ctx)?)),
            YamlValue::Sequence(seq) => {
                let rendered: Result<Vec<_>> =
                    seq.iter().map(|v| self.render_value(v, ctx)).collect();
                Ok(YamlValue::Sequence(rendered?))
            }
            YamlValue::Mapping(map) => {
                let mut rendered = serde_yaml::Mapping::new();
                for (key, val) in map {
                    rendered.insert(key.clone(), self.render_value(val, ctx)?);
                }
                Ok(YamlValue::Mapping(rendered))
            }
            other => Err(Error::Templating(format!(
                "unsupported value type '{}'",
                value_kind(other)
            ))),
        }
    }

    /// Render a parameter mapping: values are rendered, keys are untouched.
    pub fn render_params(
        &self,
        params: &IndexMap<String, YamlValue>,
        ctx: &RenderContext,
    ) -> Result<IndexMap<String, YamlValue>> {
        params
            .iter()
            .map(|(key, value)| Ok((key.clone(), self.render_value(value, ctx)?)))
            .collect()
    }

    /// Evaluate an already-rendered condition expression against the context.
    ///
    /// An empty expression is false. Otherwise the text is evaluated as a
    /// boolean-producing expression; a non-boolean result is coerced by its
    /// textual form (`true`, `yes`, `1`).
    pub fn evaluate_condition(&self, expression: &str, ctx: &RenderContext) -> Result<bool> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Ok(false);
        }
        let wrapped = format!("{{{{ {} }}}}", expression);
        let result = self.env.render_str(&wrapped, ctx)?;
        Ok(matches!(
            result.trim().to_lowercase().as_str(),
            "true" | "yes" | "1"
        ))
    }
}

fn value_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "bool",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged",
    }
}
