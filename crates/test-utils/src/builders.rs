// crates/test-utils/src/builders.rs

//! Builder for a [`RunConfig`] with sensible test defaults.

use std::path::Path;

use moodup::instance::DbCredentials;
use moodup::ops::Selection;
use moodup::setup::RunConfig;

pub struct RunConfigBuilder {
    cfg: RunConfig,
}

impl RunConfigBuilder {
    /// All paths rooted under `root` (usually a tempdir), nothing selected.
    pub fn new(root: &Path) -> Self {
        Self {
            cfg: RunConfig {
                dry_run: false,
                verbose: false,
                force_continue: false,
                selection: Selection::default(),
                full_backup: false,
                sync_submodules: false,
                restore_submodules: false,
                maintenance_mode: false,
                restart_webserver: false,
                restart_database: false,
                moodle: "moodle".to_string(),
                path: root.to_path_buf(),
                full_path: root.join("moodle"),
                folder_backup_path: root.join("backups"),
                db_dump_path: root.join("dumps"),
                repo: "https://example.org/moodle.git".to_string(),
                branch: "MOODLE_405_STABLE".to_string(),
                chown_user: "www-data".to_string(),
                chown_group: "www-data".to_string(),
                db: None,
                config_php: None,
                estimated_dump_bytes: None,
            },
        }
    }

    pub fn with_backup(mut self) -> Self {
        self.cfg.selection.backup = true;
        self
    }

    pub fn with_dump(mut self) -> Self {
        self.cfg.selection.dump = true;
        self
    }

    pub fn with_deploy(mut self) -> Self {
        self.cfg.selection.deploy = true;
        self
    }

    pub fn with_upgrade(mut self) -> Self {
        self.cfg.selection.cli_upgrade = true;
        self
    }

    pub fn with_db(mut self, name: &str, user: &str, pass: &str) -> Self {
        self.cfg.db = Some(DbCredentials {
            name: name.to_string(),
            user: user.to_string(),
            pass: pass.to_string(),
        });
        self
    }

    pub fn sync_submodules(mut self, on: bool) -> Self {
        self.cfg.sync_submodules = on;
        self
    }

    pub fn restore_submodules(mut self, on: bool) -> Self {
        self.cfg.restore_submodules = on;
        self
    }

    pub fn full_backup(mut self, on: bool) -> Self {
        self.cfg.full_backup = on;
        self
    }

    pub fn force_continue(mut self, on: bool) -> Self {
        self.cfg.force_continue = on;
        self
    }

    pub fn maintenance_mode(mut self, on: bool) -> Self {
        self.cfg.maintenance_mode = on;
        self
    }

    pub fn config_php(mut self, content: &str) -> Self {
        self.cfg.config_php = Some(content.to_string());
        self
    }

    pub fn build(self) -> RunConfig {
        self.cfg
    }
}
