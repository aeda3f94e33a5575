// src/prompt.rs

//! Interactive yes/no prompts.
//!
//! The timed variant backs the health gate: a background thread reads one
//! line from stdin and `recv_timeout` takes the phase default when nothing
//! arrives in time, so unattended runs never hang on a prompt.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::errors::{MoodupError, Result};

/// `Some(Some(answer))` for an explicit yes/no, `Some(None)` for cancel,
/// `None` for unrecognised input.
fn parse_answer(input: &str) -> Option<Option<bool>> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Some(true)),
        "n" | "no" => Some(Some(false)),
        "c" | "cancel" => Some(None),
        _ => None,
    }
}

pub trait Prompter: Send + Sync {
    /// Ask a yes/no/cancel question. Empty input takes the default when one
    /// exists; cancel aborts the whole run.
    fn confirm(&self, question: &str, default: Option<bool>) -> Result<bool>;

    /// Ask a yes/no question, taking `default` automatically when no answer
    /// arrives within `timeout`.
    fn confirm_timeout(&self, question: &str, default: bool, timeout: Duration) -> Result<bool>;

    /// Read one line of free-form input.
    fn read_line(&self, prompt: &str) -> Result<String>;
}

/// Prompter reading from the terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str, default: Option<bool>) -> Result<bool> {
        let options = match default {
            Some(true) => "Yes(y)/No(n)/Cancel(c) Default=y",
            Some(false) => "Yes(y)/No(n)/Cancel(c) Default=n",
            None => "Yes(y)/No(n)/Cancel(c)",
        };

        loop {
            print!("{question} {options}: ");
            io::stdout().flush()?;

            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line)? == 0 {
                // stdin closed; take the default rather than spin
                return match default {
                    Some(answer) => Ok(answer),
                    None => Err(MoodupError::Canceled),
                };
            }

            match parse_answer(&line) {
                Some(Some(answer)) => return Ok(answer),
                Some(None) => {
                    warn!("User canceled the operation.");
                    return Err(MoodupError::Canceled);
                }
                None => {
                    if line.trim().is_empty()
                        && let Some(answer) = default
                    {
                        return Ok(answer);
                    }
                }
            }
        }
    }

    fn confirm_timeout(&self, question: &str, default: bool, timeout: Duration) -> Result<bool> {
        let marker = if default { "y" } else { "n" };
        print!("{question} Yes(y)/No(n) Default={marker}: ");
        io::stdout().flush()?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line).is_ok() {
                let _ = tx.send(line);
            }
        });

        match rx.recv_timeout(timeout) {
            Ok(line) => match parse_answer(&line) {
                Some(Some(answer)) => Ok(answer),
                Some(None) => {
                    warn!("User canceled the operation.");
                    Err(MoodupError::Canceled)
                }
                None => Ok(default),
            },
            Err(_) => {
                info!(
                    "No answer within {}s, continuing with the default ({marker}).",
                    timeout.as_secs()
                );
                Ok(default)
            }
        }
    }

    fn read_line(&self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}
