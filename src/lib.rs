// src/lib.rs

//! moodup: maintenance orchestrator for a self-hosted Moodle instance.
//!
//! One run resolves an interactive (or flag-driven) selection of
//! operations, executes them on a fixed concurrency plan, and reports how
//! long everything took. See the module docs for the individual pieces.

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod git;
pub mod health;
pub mod instance;
pub mod logging;
pub mod monitor;
pub mod ops;
pub mod prompt;
pub mod services;
pub mod setup;
pub mod version;

use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::errors::Result;
use crate::exec::SystemRunner;
use crate::ops::{executor, orchestrator, plan, report, RunContext};
use crate::prompt::TerminalPrompter;
use crate::services::ServiceManager;

pub(crate) const SEPARATOR: &str = "----------------------------------------";

/// Run one maintenance session end to end.
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = std::path::Path::new(&args.config);
    config::ensure_config_exists(config_path)?;
    let cfg = config::load_and_validate(config_path)?;
    logging::init_logging(args.log_level, &cfg.logging)?;

    if cfg.settings.dry_run || args.dry_run {
        warn!("Dry run enabled: commands will be logged, not executed.");
    }

    let runner = SystemRunner::new(cfg.settings.dry_run || args.dry_run);
    let prompter = TerminalPrompter;
    let run_cfg = setup::resolve(&args, &cfg, &runner, &prompter)?;

    let total_timer = Instant::now();
    info!("Started at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let services = ServiceManager::new(&runner);
    if run_cfg.restart_webserver {
        services.webserver("stop")?;
    }
    if run_cfg.restart_database {
        services.database("restart")?;
        if !run_cfg.dry_run {
            // give the engine a moment to come back up
            thread::sleep(Duration::from_secs(2));
        }
    }

    let plan = plan::build_plan(&run_cfg.selection);
    let ctx = RunContext {
        cfg: &run_cfg,
        runner: &runner,
        prompter: &prompter,
    };
    let (mut outcomes, lane_wall) = orchestrator::execute_plan(&plan, &ctx);

    if run_cfg.restart_webserver {
        services.webserver("start")?;
    }

    if plan.cli_upgrade {
        outcomes.push(executor::execute_upgrade(&ctx)?);
    }

    report::emit(
        &outcomes,
        plan.is_parallel(),
        lane_wall,
        total_timer.elapsed(),
        &run_cfg,
    );

    Ok(())
}
