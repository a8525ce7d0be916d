//! Execution driver: iterates inventory targets, drives the task generator,
//! dispatches nuggets, and accumulates the run ledger.
//!
//! Execution is strictly sequential and synchronous: one dashboard at a time,
//! one task at a time. Loop-expanded tasks may depend on side effects of
//! earlier siblings on the same working copy, so no reordering or parallel
//! dispatch is performed.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_yaml::Value as YamlValue;
use tracing::{debug, info, warn};

use crate::dashboard::{Dashboard, PbitTemplate};
use crate::error::{Error, Result};
use crate::generator::TaskGenerator;
use crate::inventory::{DashboardData, Vars};
use crate::nuggets::{NuggetError, NuggetRegistry};
use crate::parser;
use crate::tasks::{ExecutionResult, OnError, RenderedTask, TaskDefinition};
use crate::template::{RenderContext, Renderer};

/// The full run record: dashboard name to ordered task results.
///
/// Insertion order equals inventory order; each list holds one entry per task
/// instance, including loop-expanded and skipped ones, in execution order.
pub type Ledger = IndexMap<String, Vec<ExecutionResult>>;

const DEFAULT_INVENTORY: &str = "inventory.yaml";
const DEFAULT_TASKS: &str = "tasks.yaml";
const DEFAULT_VARS: &str = "vars.yaml";
const DEFAULT_TEMPLATE: &str = "dashboard_template.pbit";

/// Drives one full run over the inventory.
pub struct Executor {
    base_path: PathBuf,
    inventory_file: PathBuf,
    tasks_file: PathBuf,
    vars_file: PathBuf,
    template_file: PathBuf,
    registry: NuggetRegistry,
    renderer: Renderer,
}

impl Executor {
    /// Create an executor rooted at a project directory, with the default
    /// file names for the inventory, tasks, vars, and template.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        Self {
            inventory_file: base_path.join(DEFAULT_INVENTORY),
            tasks_file: base_path.join(DEFAULT_TASKS),
            vars_file: base_path.join(DEFAULT_VARS),
            template_file: base_path.join(DEFAULT_TEMPLATE),
            registry: NuggetRegistry::with_builtins(),
            renderer: Renderer::new(),
            base_path,
        }
    }

    /// Override the inventory file path.
    pub fn with_inventory_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.inventory_file = path.into();
        self
    }

    /// Override the tasks file path.
    pub fn with_tasks_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.tasks_file = path.into();
        self
    }

    /// Override the extra-variables file path.
    pub fn with_vars_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.vars_file = path.into();
        self
    }

    /// Override the dashboard template path.
    pub fn with_template_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_file = path.into();
        self
    }

    /// Replace the nugget registry (custom nuggets, test doubles).
    pub fn with_registry(mut self, registry: NuggetRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Render the template against the inventory by executing the task list
    /// once per dashboard.
    ///
    /// Returns the complete ledger, or the first fatal error. A fatal abort
    /// never returns a partial ledger; temporary container state is reclaimed
    /// either way.
    pub fn execute(&self) -> Result<Ledger> {
        let inventory = parser::load_inventory(&self.inventory_file)?;
        let task_list = parser::load_tasks(&self.tasks_file)?;
        let vars = if self.vars_file.exists() {
            parser::load_vars(&self.vars_file)?
        } else {
            Vars::new()
        };

        let template = PbitTemplate::open(&self.template_file)?;
        let mut ledger = Ledger::new();

        for (dashboard_name, dashboard_data) in &inventory.dashboards {
            info!(dashboard = %dashboard_name, "processing dashboard");
            let context = self.build_context(dashboard_name, dashboard_data, &vars);
            let mut handle = template.stage(dashboard_name)?;
            let results = self.run_dashboard(
                &task_list.tasks,
                context,
                dashboard_name,
                &mut handle.dashboard,
            )?;
            handle.close()?;
            ledger.insert(dashboard_name.clone(), results);
        }

        Ok(ledger)
    }

    /// Build the initial context for one dashboard, with the reserved keys.
    fn build_context(&self, name: &str, data: &DashboardData, vars: &Vars) -> RenderContext {
        let mut context = RenderContext::new();
        context.insert(
            "dashboard_name".to_string(),
            YamlValue::String(name.to_string()),
        );
        context.insert("dashboard_data".to_string(), mapping_value(data));
        context.insert("vars".to_string(), mapping_value(vars));
        context.insert(
            "base_path".to_string(),
            YamlValue::String(self.base_path.display().to_string()),
        );
        context
    }

    fn run_dashboard(
        &self,
        tasks: &[TaskDefinition],
        context: RenderContext,
        dashboard_name: &str,
        dashboard: &mut Dashboard,
    ) -> Result<Vec<ExecutionResult>> {
        let mut results = Vec::new();

        for rendered in TaskGenerator::new(tasks, &self.renderer, context) {
            let task = rendered?;
            if !task.when {
                debug!(task = %task.name, "condition not met, skipping");
                results.push(ExecutionResult::skipped());
                continue;
            }

            match self.dispatch(&task, dashboard) {
                Ok(payload) => {
                    if let (Some(register), Some(payload)) = (&task.register, &payload) {
                        debug!(task = %task.name, register = %register, ?payload, "result captured");
                    }
                    results.push(ExecutionResult::success(payload));
                }
                Err(err) if task.on_error == OnError::Ignore => {
                    warn!(task = %task.name, error = %err, "nugget failed, continuing per on_error policy");
                    results.push(ExecutionResult::failed());
                }
                Err(NuggetError::NotFound(identifier)) => {
                    return Err(Error::NuggetNotFound(identifier))
                }
                Err(err) => {
                    return Err(Error::nugget_execution(
                        task.nugget.as_str(),
                        dashboard_name,
                        err,
                    ))
                }
            }
        }

        Ok(results)
    }

    /// Resolve, build, and run the nugget for one rendered task.
    fn dispatch(
        &self,
        task: &RenderedTask,
        dashboard: &mut Dashboard,
    ) -> std::result::Result<Option<YamlValue>, NuggetError> {
        let factory = self.registry.resolve(&task.nugget)?;
        let nugget = factory(&task.params)?;
        debug!(task = %task.name, nugget = %task.nugget, "dispatching nugget");
        nugget.run(dashboard)
    }
}

fn mapping_value(map: &IndexMap<String, YamlValue>) -> YamlValue {
    YamlValue::Mapping(
        map.iter()
            .map(|(key, value)| (YamlValue::String(key.clone()), value.clone()))
            .collect(),
    )
}
