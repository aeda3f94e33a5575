// src/exec/process.rs

//! Real command execution via `std::process`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use tracing::info;

use crate::errors::Result;

use super::{Cmd, CmdOutput, CommandRunner, StreamSource};

/// Executes commands on the host, or only logs them in dry-run mode.
pub struct SystemRunner {
    dry: bool,
}

impl SystemRunner {
    pub fn new(dry: bool) -> Self {
        Self { dry }
    }

    fn command(cmd: &Cmd) -> Command {
        let mut command = Command::new(cmd.program());
        command.args(cmd.raw_args());
        if let Some(dir) = cmd.cwd() {
            command.current_dir(dir);
        }
        command
    }

    fn run_real(&self, cmd: &Cmd) -> Result<CmdOutput> {
        let output = Self::command(cmd)
            .output()
            .with_context(|| format!("failed to run '{}'", cmd.display()))?;

        Ok(CmdOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &Cmd) -> Result<CmdOutput> {
        if self.dry {
            info!("[Dry Run] Would run: {}", cmd.display());
            return Ok(CmdOutput::dry());
        }
        self.run_real(cmd)
    }

    fn run_redirected(&self, cmd: &Cmd, stdout_path: &Path) -> Result<CmdOutput> {
        if self.dry {
            info!(
                "[Dry Run] Would run: {} > {}",
                cmd.display(),
                stdout_path.display()
            );
            return Ok(CmdOutput::dry());
        }

        let file = File::create(stdout_path)
            .with_context(|| format!("failed to open {} for writing", stdout_path.display()))?;

        let child = Self::command(cmd)
            .stdout(Stdio::from(file))
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to run '{}'", cmd.display()))?;

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed waiting for '{}'", cmd.display()))?;

        Ok(CmdOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::new(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_streamed(
        &self,
        cmd: &Cmd,
        on_line: &mut dyn FnMut(StreamSource, &str),
    ) -> Result<CmdOutput> {
        if self.dry {
            info!("[Dry Run] Would run: {}", cmd.display());
            return Ok(CmdOutput::dry());
        }

        let mut child = Self::command(cmd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to run '{}'", cmd.display()))?;

        let (tx, rx) = mpsc::channel::<(StreamSource, String)>();

        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            let tx = tx.clone();
            readers.push(thread::spawn(move || {
                for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
                    if tx.send((StreamSource::Stdout, line)).is_err() {
                        break;
                    }
                }
            }));
        }
        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            readers.push(thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                    if tx.send((StreamSource::Stderr, line)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        for (source, line) in rx {
            on_line(source, &line);
        }
        for reader in readers {
            let _ = reader.join();
        }

        let status = child
            .wait()
            .with_context(|| format!("failed waiting for '{}'", cmd.display()))?;

        Ok(CmdOutput {
            code: status.code(),
            success: status.success(),
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    fn probe(&self, cmd: &Cmd) -> Result<CmdOutput> {
        // Probes are read-only, so they execute for real even in dry-run.
        self.run_real(cmd)
    }

    fn is_dry(&self) -> bool {
        self.dry
    }
}
