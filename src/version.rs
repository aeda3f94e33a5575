// src/version.rs

//! Moodle version detection and the local-vs-remote gate.
//!
//! `version.php` moved into `public/` with Moodle 5.x, so both locations are
//! tried for the local file and the remote lookup falls back to the other
//! layout on a 404. Version detection failures are never fatal; only a local
//! build newer than the branch tip stops the run, since checking out the
//! branch would downgrade the instance.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{error, info, warn};

use crate::errors::{MoodupError, Result};

static RELEASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$release\s*=\s*'([^']+)'").unwrap());
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$version\s*=\s*([\d.]+);").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct VersionInfo {
    /// Human-readable release string, e.g. "4.5.3 (Build: 20250414)".
    pub release: Option<String>,
    /// Numeric build version, e.g. "2024100703.00".
    pub build: Option<String>,
}

impl VersionInfo {
    pub fn unknown() -> Self {
        Self {
            release: None,
            build: None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.build.is_some()
    }
}

pub fn parse_version_php(content: &str) -> VersionInfo {
    VersionInfo {
        release: RELEASE_RE
            .captures(content)
            .map(|c| c[1].to_string()),
        build: VERSION_RE.captures(content).map(|c| c[1].to_string()),
    }
}

/// Read the installed version from the checkout, trying the 5.x layout
/// first.
pub fn local_version(moodle_path: &Path) -> VersionInfo {
    for candidate in [
        moodle_path.join("public").join("version.php"),
        moodle_path.join("version.php"),
    ] {
        if let Ok(content) = fs::read_to_string(&candidate) {
            return parse_version_php(&content);
        }
    }
    warn!("Moodle version file not found.");
    VersionInfo::unknown()
}

/// Fetch the branch tip's version.php from the repository host.
pub fn remote_version(repo: &str, branch: &str) -> VersionInfo {
    let client = match reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            error!("Could not build HTTP client: {err}");
            return VersionInfo::unknown();
        }
    };

    let base = repo.trim_end_matches(".git");
    for prefix in ["public/", ""] {
        let url = format!("{base}/raw/{branch}/{prefix}version.php");
        match client.get(&url).send() {
            Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => continue,
            Ok(response) if response.status().is_success() => match response.text() {
                Ok(body) => return parse_version_php(&body),
                Err(err) => {
                    error!("Could not read remote version.php: {err}");
                    return VersionInfo::unknown();
                }
            },
            Ok(response) => {
                warn!(
                    "Remote version lookup returned {} for {url}",
                    response.status()
                );
                return VersionInfo::unknown();
            }
            Err(err) => {
                error!("Remote version lookup failed: {err}");
                return VersionInfo::unknown();
            }
        }
    }
    warn!("Remote version.php not found on branch {branch}.");
    VersionInfo::unknown()
}

/// Fatal only when the local build is strictly newer than the branch tip.
pub fn check_version_gate(local: &VersionInfo, remote: &VersionInfo) -> Result<()> {
    let (Some(local_build), Some(remote_build)) = (&local.build, &remote.build) else {
        return Ok(());
    };
    let (Ok(local_num), Ok(remote_num)) = (local_build.parse::<f64>(), remote_build.parse::<f64>())
    else {
        error!("Could not compare versions '{local_build}' and '{remote_build}'.");
        return Ok(());
    };

    if local_num == remote_num {
        info!("Moodle is already up-to-date with {remote_build}.");
    } else if remote_num > local_num {
        info!("Proceeding with upgrade from {local_build} to {remote_build}.");
    } else {
        return Err(MoodupError::Preflight(format!(
            "installed version {local_build} is newer than the branch tip {remote_build}; \
             refusing to downgrade"
        )));
    }
    Ok(())
}
