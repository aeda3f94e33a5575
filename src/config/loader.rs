// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::ConfigFile;
use crate::config::validate::validate;
use crate::errors::{MoodupError, Result};

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate(&config)?;
    Ok(config)
}

/// Make sure the config file exists before anything else runs.
///
/// When it is missing but a `config_template.toml` sits next to it, the
/// template is copied into place and the run still aborts so the operator
/// can edit it first. Missing both is fatal too.
pub fn ensure_config_exists(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }

    let template = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join("config_template.toml");

    if template.exists() {
        fs::copy(&template, path)?;
        Err(MoodupError::ConfigError(format!(
            "'{}' was created from config_template.toml; edit it to your setup and run again",
            path.display()
        )))
    } else {
        Err(MoodupError::ConfigError(format!(
            "missing '{}' and no config_template.toml next to it; please create the config file manually",
            path.display()
        )))
    }
}

/// Helper to resolve the default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("moodup.toml")
}
