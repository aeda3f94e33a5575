// crates/test-utils/src/scripted.rs

//! Scripted fakes for the command runner and the prompter.
//!
//! `ScriptedRunner` matches commands by substring against their loggable
//! rendering and replays canned outcomes, recording every call so tests can
//! assert on what would have been executed. Unmatched commands succeed with
//! empty output.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use moodup::errors::Result;
use moodup::exec::{Cmd, CmdOutput, CommandRunner, StreamSource};
use moodup::prompt::Prompter;

/// One canned command result.
#[derive(Debug, Clone)]
pub struct ScriptedOutcome {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub delay: Duration,
    pub lines: Vec<String>,
}

impl ScriptedOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            delay: Duration::ZERO,
            lines: Vec::new(),
        }
    }

    pub fn fail(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stderr: stderr.into(),
            ..Self::ok()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Lines fed to `run_streamed` callbacks as stdout.
    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = lines.into_iter().map(Into::into).collect();
        self
    }
}

/// Command runner replaying scripted outcomes. First matching rule wins.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, ScriptedOutcome)>,
    panic_on: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for commands whose rendering contains `pattern`.
    pub fn on(mut self, pattern: impl Into<String>, outcome: ScriptedOutcome) -> Self {
        self.rules.push((pattern.into(), outcome));
        self
    }

    /// Panic when a matching command runs, to exercise the panic boundary.
    pub fn panic_on(mut self, pattern: impl Into<String>) -> Self {
        self.panic_on = Some(pattern.into());
        self
    }

    /// Loggable renderings of every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn resolve(&self, cmd: &Cmd) -> ScriptedOutcome {
        let rendered = cmd.display();
        self.calls.lock().unwrap().push(rendered.clone());

        if let Some(pattern) = &self.panic_on
            && rendered.contains(pattern.as_str())
        {
            panic!("scripted panic for '{rendered}'");
        }

        let outcome = self
            .rules
            .iter()
            .find(|(pattern, _)| rendered.contains(pattern.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(ScriptedOutcome::ok);

        if !outcome.delay.is_zero() {
            thread::sleep(outcome.delay);
        }
        outcome
    }

    fn to_output(outcome: &ScriptedOutcome) -> CmdOutput {
        CmdOutput {
            code: outcome.code,
            success: outcome.success,
            stdout: outcome.stdout.clone(),
            stderr: outcome.stderr.clone(),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, cmd: &Cmd) -> Result<CmdOutput> {
        let outcome = self.resolve(cmd);
        Ok(Self::to_output(&outcome))
    }

    fn run_redirected(&self, cmd: &Cmd, stdout_path: &Path) -> Result<CmdOutput> {
        let outcome = self.resolve(cmd);
        fs::write(stdout_path, &outcome.stdout)?;
        Ok(CmdOutput {
            stdout: String::new(),
            ..Self::to_output(&outcome)
        })
    }

    fn run_streamed(
        &self,
        cmd: &Cmd,
        on_line: &mut dyn FnMut(StreamSource, &str),
    ) -> Result<CmdOutput> {
        let outcome = self.resolve(cmd);
        for line in &outcome.lines {
            on_line(StreamSource::Stdout, line);
        }
        Ok(Self::to_output(&outcome))
    }

    fn probe(&self, cmd: &Cmd) -> Result<CmdOutput> {
        self.run(cmd)
    }

    fn is_dry(&self) -> bool {
        false
    }
}

/// Prompter replaying queued answers. Running out of answers takes the
/// prompt default, or "no" when there is none.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    lines: Mutex<VecDeque<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answers<I: IntoIterator<Item = bool>>(self, answers: I) -> Self {
        self.answers.lock().unwrap().extend(answers);
        self
    }

    pub fn with_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.lock().unwrap().extend(lines.into_iter().map(Into::into));
        self
    }

    /// Every question asked so far, in order.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str, default: Option<bool>) -> Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .or(default)
            .unwrap_or(false))
    }

    fn confirm_timeout(&self, question: &str, default: bool, _timeout: Duration) -> Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(default))
    }

    fn read_line(&self, prompt: &str) -> Result<String> {
        self.questions.lock().unwrap().push(prompt.to_string());
        Ok(self.lines.lock().unwrap().pop_front().unwrap_or_default())
    }
}
