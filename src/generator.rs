//! Task generator: expands the declarative task list into a lazy, ordered,
//! one-shot sequence of concrete task instances.
//!
//! Each definition either renders once against the initial context or, when a
//! `loop` expression is present, once per loop item against an independent
//! copy of the context with the loop variable bound. Yield order equals
//! declaration order, and within a loop, item order; downstream naming and
//! messages depend on this being deterministic.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde_yaml::Value as YamlValue;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tasks::{Condition, RenderedTask, TaskDefinition};
use crate::template::{RenderContext, Renderer};

/// Lazily renders a task list into concrete [`RenderedTask`] instances.
///
/// The context is cloned at construction; restarting iteration requires a new
/// generator.
pub struct TaskGenerator<'a> {
    definitions: std::slice::Iter<'a, TaskDefinition>,
    renderer: &'a Renderer,
    context: RenderContext,
    current: Option<LoopState<'a>>,
}

struct LoopState<'a> {
    definition: &'a TaskDefinition,
    items: VecDeque<YamlValue>,
}

impl<'a> TaskGenerator<'a> {
    /// Create a generator over `definitions` with the given initial context.
    pub fn new(
        definitions: &'a [TaskDefinition],
        renderer: &'a Renderer,
        context: RenderContext,
    ) -> Self {
        Self {
            definitions: definitions.iter(),
            renderer,
            context,
            current: None,
        }
    }

    /// Render the loop expression and parse it as a literal sequence.
    ///
    /// The parse is data-only (scalars, sequences, mappings); the expression
    /// cannot smuggle code past the template engine.
    fn expand_loop(&self, definition: &TaskDefinition, expression: &str) -> Result<VecDeque<YamlValue>> {
        let rendered = self.renderer.render_str(expression, &self.context)?;
        let parsed: YamlValue =
            serde_yaml::from_str(&rendered).map_err(|err| Error::LoopExpansion {
                task: definition.name.clone(),
                message: err.to_string(),
            })?;
        match parsed {
            YamlValue::Sequence(items) => {
                debug!(task = %definition.name, items = items.len(), "loop expanded");
                Ok(items.into())
            }
            _ => Err(Error::LoopExpansion {
                task: definition.name.clone(),
                message: format!("'{}' is not a sequence", rendered.trim()),
            }),
        }
    }

    /// Render every templated field of a definition against one context.
    ///
    /// The first field failure aborts the task's rendering; evaluator errors
    /// are always fatal.
    fn render_task(&self, definition: &TaskDefinition, context: &RenderContext) -> Result<RenderedTask> {
        let name = self.renderer.render_str(&definition.name, context)?;
        let nugget = self.renderer.render_str(&definition.nugget, context)?;
        let params = match &definition.params {
            Some(params) => self.renderer.render_params(params, context)?,
            None => IndexMap::new(),
        };
        let register = definition
            .register
            .as_ref()
            .map(|r| self.renderer.render_str(r, context))
            .transpose()?;
        let when = match &definition.when {
            None => true,
            Some(Condition::Literal(value)) => *value,
            Some(Condition::Expression(expression)) => {
                let rendered = self.renderer.render_str(expression, context)?;
                self.renderer.evaluate_condition(&rendered, context)?
            }
        };

        Ok(RenderedTask {
            name,
            nugget,
            params,
            when,
            register,
            on_error: definition.on_error,
        })
    }
}

impl Iterator for TaskGenerator<'_> {
    type Item = Result<RenderedTask>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Drain the loop in progress before moving to the next definition.
            let pending = match self.current.as_mut() {
                Some(state) => match state.items.pop_front() {
                    Some(item) => Some((state.definition, item)),
                    None => {
                        self.current = None;
                        None
                    }
                },
                None => None,
            };

            if let Some((definition, item)) = pending {
                // Each iteration gets its own copy of the initial context so
                // one item's rendering can never leak into the next.
                let mut context = self.context.clone();
                context.insert(definition.loop_key.clone(), item);
                return Some(self.render_task(definition, &context));
            }

            let definition = self.definitions.next()?;
            match &definition.loop_ {
                None => return Some(self.render_task(definition, &self.context)),
                Some(expression) => match self.expand_loop(definition, expression) {
                    Ok(items) => self.current = Some(LoopState { definition, items }),
                    Err(err) => return Some(Err(err)),
                },
            }
        }
    }
}
