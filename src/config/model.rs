// src/config/model.rs

//! Typed view of `moodup.toml`.
//!
//! Every field has a serde default so a minimal config file stays minimal;
//! semantic checks live in [`validate`](super::validate).

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: SettingsSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsSection {
    /// Log every external command instead of executing it.
    pub dry_run: bool,
    /// Name of the Moodle directory inside `path`.
    pub moodle: String,
    /// Instance root containing the Moodle tree (and moodledata for full
    /// backups).
    pub path: String,
    /// Where backup snapshots land; empty or "pwd" means the current
    /// working directory.
    pub folder_backup_path: String,
    /// Where database dumps land; empty or "pwd" means the current working
    /// directory.
    pub db_dump_path: String,
    /// Git repository to re-clone the Moodle tree from.
    pub repo: String,
    /// Branch to check out after the clone.
    pub branch: String,
    pub chown_user: String,
    pub chown_group: String,
    /// Expected dump size, used for percentage/ETA estimates while the dump
    /// runs. Unset disables the estimate.
    pub estimated_dump_size_mb: Option<u64>,
}

impl Default for SettingsSection {
    fn default() -> Self {
        Self {
            dry_run: false,
            moodle: "moodle".to_string(),
            path: ".".to_string(),
            folder_backup_path: String::new(),
            db_dump_path: String::new(),
            repo: String::new(),
            branch: String::new(),
            chown_user: "www-data".to_string(),
            chown_group: "www-data".to_string(),
            estimated_dump_size_mb: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Read dbname/dbuser/dbpass out of the deployed `config.php` instead
    /// of the fields below.
    pub read_db_from_config: bool,
    pub db_name: String,
    pub db_user: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            read_db_from_config: true,
            db_name: "moodle".to_string(),
            db_user: "root".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub log_to_console: bool,
    pub log_to_file: bool,
    pub log_file_path: String,
    pub log_level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            log_to_console: true,
            log_to_file: false,
            log_file_path: "moodup.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}
