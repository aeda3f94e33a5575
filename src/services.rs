// src/services.rs

//! Web server and database service control through systemd.
//!
//! Installed units are detected with `systemctl cat`, which succeeds only
//! for units systemd actually knows about. The web server takes the first
//! match since only one serves Moodle; database actions apply to every
//! installed engine, since the dump target may not be the only one running.

use tracing::{error, info, warn};

use crate::errors::Result;
use crate::exec::{Cmd, CommandRunner};

const WEBSERVERS: &[&str] = &["apache2", "nginx"];
const DATABASES: &[&str] = &[
    "mysql",
    "mariadb",
    "postgresql",
    "mssql-server",
    "mongodb",
    "redis",
];

pub struct ServiceManager<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ServiceManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn unit_exists(&self, unit: &str) -> bool {
        let cmd = Cmd::new("systemctl").arg("cat").arg(unit);
        matches!(self.runner.probe(&cmd), Ok(output) if output.success)
    }

    fn systemctl(&self, action: &str, unit: &str) -> Result<()> {
        let cmd = Cmd::new("systemctl").arg(action).arg(unit);
        let output = self.runner.run(&cmd)?;
        if output.success {
            info!("Service {unit}: {action} succeeded.");
        } else {
            error!("Service {unit}: {action} failed: {}", output.stderr.trim());
        }
        Ok(())
    }

    /// Apply `action` to the first installed web server unit.
    pub fn webserver(&self, action: &str) -> Result<()> {
        match WEBSERVERS.iter().find(|unit| self.unit_exists(unit)) {
            Some(unit) => self.systemctl(action, unit),
            None => {
                warn!("No supported web server found (Apache/Nginx).");
                Ok(())
            }
        }
    }

    /// Apply `action` to every installed database unit.
    pub fn database(&self, action: &str) -> Result<()> {
        let installed: Vec<&str> = DATABASES
            .iter()
            .copied()
            .filter(|unit| self.unit_exists(unit))
            .collect();
        if installed.is_empty() {
            warn!("No supported database service found.");
            return Ok(());
        }
        for unit in installed {
            self.systemctl(action, unit)?;
        }
        Ok(())
    }
}
