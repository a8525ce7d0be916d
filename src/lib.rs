//! # Dashforge - Bulk dashboard generation from a single template
//!
//! Dashforge renders a PowerBI template (`.pbit`) into one customized
//! dashboard per inventory entry, driven by a declarative YAML task list with
//! Ansible-style semantics: Jinja2-style templating, `when` conditionals,
//! `loop` expansion, and per-task `on_error` policy.
//!
//! ## Core Concepts
//!
//! - **Inventory**: named dashboards and their target-specific data
//! - **Tasks**: declarative descriptions of nugget invocations, possibly
//!   parametrized, conditional, or loop-expanded
//! - **Nuggets**: pluggable units of work applied to a staged working copy of
//!   the template
//! - **Ledger**: the ordered record of every task outcome per dashboard
//!
//! ## Architecture Overview
//!
//! ```text
//! Executor ──per dashboard──▶ TaskGenerator(tasks, context)
//!                                   │ Renderer (templating + conditions)
//!                                   ▼
//!                             RenderedTask ──▶ NuggetRegistry ──▶ nugget.run()
//!                                   │                                 │
//!                                skipped ◀── when == false         result
//!                                   └───────────▶ Ledger ◀────────────┘
//! ```
//!
//! Execution is strictly sequential: one dashboard at a time, one task at a
//! time, each loop iteration rendered against its own copy of the context.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use dashforge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let ledger = Executor::new("./project").execute()?;
//!     for (dashboard, results) in &ledger {
//!         println!("{dashboard}: {} tasks", results.len());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod dashboard;
pub mod error;
pub mod executor;
pub mod generator;
pub mod inventory;
pub mod nuggets;
pub mod parser;
pub mod tasks;
pub mod template;

pub mod prelude {
    //! Convenient re-exports of commonly used types.
    pub use crate::dashboard::{Dashboard, DashboardHandle, PbitTemplate};
    pub use crate::error::{Error, Result};
    pub use crate::executor::{Executor, Ledger};
    pub use crate::generator::TaskGenerator;
    pub use crate::inventory::{DashboardData, Inventory, Vars};
    pub use crate::nuggets::{
        Nugget, NuggetError, NuggetParams, NuggetRegistry, NuggetResult, ParamExt,
    };
    pub use crate::tasks::{
        Condition, ExecutionResult, ExecutionStatus, OnError, RenderedTask, TaskDefinition,
        TaskList,
    };
    pub use crate::template::{RenderContext, Renderer};
}

pub use error::{Error, Result};
pub use executor::{Executor, Ledger};
