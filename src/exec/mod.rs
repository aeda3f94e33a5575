// src/exec/mod.rs

//! External process boundary.
//!
//! Every external tool (rsync, mysqldump, git, systemctl, php, cp, chown)
//! goes through the [`CommandRunner`] trait. This gives one place for
//! dry-run handling and secret masking, and lets tests script command
//! outcomes without spawning anything.

pub mod process;

pub use process::SystemRunner;

use std::path::{Path, PathBuf};

use crate::errors::Result;

/// A command to execute, built up fluently.
///
/// Arguments added with [`Cmd::arg_masked`] render as `*****` in logs and
/// dry-run output.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    masked: Vec<usize>,
    cwd: Option<PathBuf>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            masked: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn arg_path(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an argument whose value must never reach the logs.
    pub fn arg_masked(mut self, arg: impl Into<String>) -> Self {
        self.masked.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub(crate) fn raw_args(&self) -> &[String] {
        &self.args
    }

    pub(crate) fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Loggable rendering with masked arguments hidden.
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.clone());
        for (i, arg) in self.args.iter().enumerate() {
            if self.masked.contains(&i) {
                parts.push("*****".to_string());
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

/// Which stream a streamed line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// Captured result of one external command.
///
/// A nonzero exit is a normal `CmdOutput` with `success == false`; only a
/// failure to spawn the process at all surfaces as an `Err`.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    /// Placeholder success used by dry-run.
    pub fn dry() -> Self {
        Self {
            code: Some(0),
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

/// Trait abstracting how external commands are executed.
///
/// Production code uses [`SystemRunner`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait CommandRunner: Send + Sync {
    /// Run and capture stdout/stderr.
    fn run(&self, cmd: &Cmd) -> Result<CmdOutput>;

    /// Run with stdout redirected into a file, stderr captured.
    fn run_redirected(&self, cmd: &Cmd, stdout_path: &Path) -> Result<CmdOutput>;

    /// Run with both streams forwarded line-by-line as they arrive.
    fn run_streamed(
        &self,
        cmd: &Cmd,
        on_line: &mut dyn FnMut(StreamSource, &str),
    ) -> Result<CmdOutput>;

    /// Read-only probe; executes even in dry-run mode.
    fn probe(&self, cmd: &Cmd) -> Result<CmdOutput>;

    /// True when this runner only logs commands instead of executing them.
    fn is_dry(&self) -> bool;
}
