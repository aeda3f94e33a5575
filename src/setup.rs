// src/setup.rs

//! Interactive run resolution.
//!
//! Flags, the config file and (unless `--non-interactive`) a series of
//! prompts are folded into one immutable [`RunConfig`]. All user input and
//! all preflight checks happen here, before any timer starts, so the
//! reported execution times never include time spent waiting on a human.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::errors::{MoodupError, Result};
use crate::exec::{Cmd, CommandRunner};
use crate::instance::{self, DbCredentials};
use crate::ops::Selection;
use crate::prompt::Prompter;
use crate::version;
use crate::SEPARATOR;

/// Fully resolved parameters for one run. Immutable once built.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dry_run: bool,
    pub verbose: bool,
    pub force_continue: bool,
    pub selection: Selection,
    pub full_backup: bool,
    pub sync_submodules: bool,
    pub restore_submodules: bool,
    pub maintenance_mode: bool,
    pub restart_webserver: bool,
    pub restart_database: bool,
    pub moodle: String,
    pub path: PathBuf,
    pub full_path: PathBuf,
    pub folder_backup_path: PathBuf,
    pub db_dump_path: PathBuf,
    pub repo: String,
    pub branch: String,
    pub chown_user: String,
    pub chown_group: String,
    pub db: Option<DbCredentials>,
    pub config_php: Option<String>,
    pub estimated_dump_bytes: Option<u64>,
}

/// Resolve everything the run needs. Prompts in a fixed order so repeated
/// runs ask the same questions the same way.
pub fn resolve(
    args: &CliArgs,
    cfg: &ConfigFile,
    runner: &dyn CommandRunner,
    prompter: &dyn Prompter,
) -> Result<RunConfig> {
    let dry_run = cfg.settings.dry_run || args.dry_run;
    let interactive = !args.non_interactive;

    let ask = |flag: bool, question: &str, default: bool| -> Result<bool> {
        if flag {
            return Ok(true);
        }
        if !interactive {
            return Ok(false);
        }
        prompter.confirm(question, Some(default))
    };

    let selection = Selection {
        backup: ask(
            args.directory_backup,
            "Do you want to backup the Moodle directory?",
            true,
        )?,
        dump: ask(args.db_dump, "Do you want to dump the Moodle database?", true)?,
        deploy: ask(
            args.git_clone,
            "Do you want to re-clone the Moodle source tree?",
            true,
        )?,
        cli_upgrade: ask(
            args.moodle_cli_upgrade,
            "Do you want to run the Moodle CLI upgrade?",
            false,
        )?,
    };

    info!("{SEPARATOR}");
    info!("Directory backup: {}", selection.backup);
    info!("Database dump: {}", selection.dump);
    info!("Git clone: {}", selection.deploy);
    info!("Moodle CLI upgrade: {}", selection.cli_upgrade);
    info!("{SEPARATOR}");

    if selection.is_empty() {
        return Err(MoodupError::NothingSelected);
    }

    let restart_webserver = ask(
        args.restart_webserver,
        "Do you want to stop the webserver during the operations?",
        true,
    )?;
    let verbose = ask(args.verbose, "Do you want verbose dump output?", false)?;

    let mut path = cfg.settings.path.clone();
    if interactive && (selection.backup || selection.deploy) {
        let correct = prompter.confirm(
            &format!("Is this the correct Moodle directory? {path}"),
            Some(true),
        )?;
        if !correct {
            path = prompter.read_line("Enter the correct Moodle directory path: ")?;
        }
    }
    let path = PathBuf::from(path.trim_end_matches('/'));
    let full_path = path.join(&cfg.settings.moodle);
    let config_php_path = full_path.join("config.php");

    let folder_backup_path = resolve_artifact_dir(&cfg.settings.folder_backup_path)?;
    let db_dump_path = resolve_artifact_dir(&cfg.settings.db_dump_path)?;

    let full_backup = if selection.backup {
        ask(
            args.full_backup,
            "Do you want a full backup (including moodledata caches)?",
            false,
        )?
    } else {
        false
    };

    let mut restart_database = false;
    let mut db = None;
    if selection.dump {
        restart_database = ask(
            args.restart_database,
            "Do you want to restart the database service before the dump?",
            false,
        )?;
        let mut creds = resolve_db_credentials(cfg, &config_php_path, interactive, prompter)?;
        preflight_db_check(&mut creds, runner, interactive, prompter)?;
        db = Some(creds);
    }

    let mut branch = cfg.settings.branch.clone();
    let mut config_php = None;
    let mut sync_submodules = false;
    let mut restore_submodules = false;
    if selection.deploy {
        if cfg.settings.repo.is_empty() || branch.is_empty() {
            return Err(MoodupError::ConfigError(
                "git clone requires 'repo' and 'branch' in [settings]".to_string(),
            ));
        }

        let local = version::local_version(&full_path);
        if let Some(release) = &local.release {
            info!("Moodle version detected: {release}");
        }
        let remote = version::remote_version(&cfg.settings.repo, &branch);
        version::check_version_gate(&local, &remote)?;

        config_php = preserve_config_php(&config_php_path, interactive, prompter)?;

        if interactive {
            let keep = prompter.confirm(
                &format!("Do you want to checkout branch {branch}?"),
                Some(true),
            )?;
            if !keep {
                branch = prompter.read_line("Enter the branch to checkout: ")?;
            }
        }

        sync_submodules = if args.sync_submodules_off {
            false
        } else if interactive {
            prompter.confirm("Do you want to sync submodules after the clone?", Some(true))?
        } else {
            true
        };
        if !sync_submodules {
            restore_submodules = ask(
                args.restore_submodules,
                "Do you want to restore submodules from the latest backup instead?",
                false,
            )?;
        }
    }

    let maintenance_mode = if selection.cli_upgrade {
        ask(
            args.enable_maintenance_mode,
            "Do you want to enable maintenance mode during the upgrade?",
            true,
        )?
    } else {
        false
    };

    if interactive {
        let confirmed = prompter.confirm("Do you want to confirm the installation?", None)?;
        if !confirmed {
            warn!("Installation not confirmed, aborting.");
            return Err(MoodupError::Canceled);
        }
    }

    Ok(RunConfig {
        dry_run,
        verbose,
        force_continue: args.force_continue,
        selection,
        full_backup,
        sync_submodules,
        restore_submodules,
        maintenance_mode,
        restart_webserver,
        restart_database,
        moodle: cfg.settings.moodle.clone(),
        path,
        full_path,
        folder_backup_path,
        db_dump_path,
        repo: cfg.settings.repo.clone(),
        branch,
        chown_user: cfg.settings.chown_user.clone(),
        chown_group: cfg.settings.chown_group.clone(),
        db,
        config_php,
        estimated_dump_bytes: cfg
            .settings
            .estimated_dump_size_mb
            .map(|mb| mb * 1024 * 1024),
    })
}

/// Empty or "pwd" means the current working directory.
fn resolve_artifact_dir(configured: &str) -> Result<PathBuf> {
    if configured.is_empty() || configured == "pwd" {
        Ok(env::current_dir()?)
    } else {
        Ok(PathBuf::from(configured.trim_end_matches('/')))
    }
}

fn resolve_db_credentials(
    cfg: &ConfigFile,
    config_php_path: &Path,
    interactive: bool,
    prompter: &dyn Prompter,
) -> Result<DbCredentials> {
    if cfg.database.read_db_from_config {
        let creds = instance::read_moodle_config(config_php_path)?;
        info!("Database credentials read from {}", config_php_path.display());
        return Ok(creds);
    }

    if !interactive {
        return Err(MoodupError::Preflight(
            "database password required: set read_db_from_config or run interactively".to_string(),
        ));
    }

    let mut pass = String::new();
    while pass.is_empty() {
        pass = prompter.read_line(&format!(
            "Enter the database password for user '{}': ",
            cfg.database.db_user
        ))?;
    }

    Ok(DbCredentials {
        name: cfg.database.db_name.clone(),
        user: cfg.database.db_user.clone(),
        pass,
    })
}

/// Verify the credentials actually open a connection before the dump lane
/// starts. One interactive password retry; a second failure is fatal.
fn preflight_db_check(
    creds: &mut DbCredentials,
    runner: &dyn CommandRunner,
    interactive: bool,
    prompter: &dyn Prompter,
) -> Result<()> {
    if runner.is_dry() {
        info!("[Dry Run] Skipping database connection check.");
        return Ok(());
    }

    let attempt = |pass: &str| -> Result<bool> {
        let cmd = Cmd::new("mysqlshow")
            .args(["-u", &creds.user])
            .arg_masked(format!("-p{pass}"))
            .arg(&creds.name);
        Ok(runner.probe(&cmd)?.success)
    };

    if attempt(&creds.pass)? {
        info!("Database connection check passed.");
        return Ok(());
    }

    if interactive {
        warn!("Could not connect to database '{}'.", creds.name);
        let retry = prompter.read_line(&format!(
            "Re-enter the database password for user '{}': ",
            creds.user
        ))?;
        if attempt(&retry)? {
            creds.pass = retry;
            info!("Database connection check passed.");
            return Ok(());
        }
    }

    Err(MoodupError::DbConnection(format!(
        "could not connect to database '{}' as user '{}'",
        creds.name, creds.user
    )))
}

/// Read config.php so it can be restored into the fresh clone.
fn preserve_config_php(
    config_php_path: &Path,
    interactive: bool,
    prompter: &dyn Prompter,
) -> Result<Option<String>> {
    if interactive {
        let copy = prompter.confirm(
            &format!("Do you want to preserve {}?", config_php_path.display()),
            Some(true),
        )?;
        if copy {
            return Ok(Some(fs::read_to_string(config_php_path)?));
        }
        let custom = prompter.read_line("Enter a config.php path to preserve (empty to skip): ")?;
        if custom.is_empty() {
            return Ok(None);
        }
        return Ok(Some(fs::read_to_string(custom)?));
    }

    if config_php_path.is_file() {
        Ok(Some(fs::read_to_string(config_php_path)?))
    } else {
        warn!("No config.php found at {}.", config_php_path.display());
        Ok(None)
    }
}
