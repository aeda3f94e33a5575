// src/instance.rs

//! Reading database credentials out of the instance's config.php.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{MoodupError, Result};

static DBNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$CFG->dbname\s*=\s*'([^']+)'").unwrap());
static DBUSER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$CFG->dbuser\s*=\s*'([^']+)'").unwrap());
static DBPASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$CFG->dbpass\s*=\s*'([^']+)'").unwrap());

#[derive(Debug, Clone)]
pub struct DbCredentials {
    pub name: String,
    pub user: String,
    pub pass: String,
}

/// Parse `$CFG->dbname`, `$CFG->dbuser` and `$CFG->dbpass` out of
/// config.php. All three must be present.
pub fn read_moodle_config(config_php: &Path) -> Result<DbCredentials> {
    let content = std::fs::read_to_string(config_php).map_err(|err| {
        MoodupError::Preflight(format!(
            "could not read {}: {err}",
            config_php.display()
        ))
    })?;

    let capture = |re: &Regex, field: &str| -> Result<String> {
        re.captures(&content)
            .map(|c| c[1].to_string())
            .ok_or_else(|| {
                MoodupError::Preflight(format!(
                    "{} does not define {field}",
                    config_php.display()
                ))
            })
    };

    Ok(DbCredentials {
        name: capture(&DBNAME_RE, "$CFG->dbname")?,
        user: capture(&DBUSER_RE, "$CFG->dbuser")?,
        pass: capture(&DBPASS_RE, "$CFG->dbpass")?,
    })
}
