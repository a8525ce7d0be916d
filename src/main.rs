//! Dashforge CLI entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dashforge::tasks::ExecutionStatus;
use dashforge::Executor;

/// Bulk PowerBI dashboard generation from a single template.
#[derive(Parser, Debug)]
#[command(name = "dashforge", version, about)]
struct Cli {
    /// Project directory holding the inventory, tasks, and template files
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Inventory file (defaults to <PATH>/inventory.yaml)
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Tasks file (defaults to <PATH>/tasks.yaml)
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Extra-variables file (defaults to <PATH>/vars.yaml, optional)
    #[arg(long)]
    vars: Option<PathBuf>,

    /// Dashboard template (defaults to <PATH>/dashboard_template.pbit)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut executor = Executor::new(&cli.path);
    if let Some(path) = cli.inventory {
        executor = executor.with_inventory_file(path);
    }
    if let Some(path) = cli.tasks {
        executor = executor.with_tasks_file(path);
    }
    if let Some(path) = cli.vars {
        executor = executor.with_vars_file(path);
    }
    if let Some(path) = cli.template {
        executor = executor.with_template_file(path);
    }

    match executor.execute() {
        Ok(ledger) => {
            for (dashboard, results) in &ledger {
                let count = |status: ExecutionStatus| {
                    results.iter().filter(|r| r.status == status).count()
                };
                println!(
                    "{dashboard}: ok={} failed={} skipped={}",
                    count(ExecutionStatus::Success),
                    count(ExecutionStatus::Failed),
                    count(ExecutionStatus::Skipped),
                );
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}

/// Initialize logging based on verbosity level.
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
