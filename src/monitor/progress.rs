// src/monitor/progress.rs

//! Dump progress monitor.
//!
//! Watches the growing dump file, warns when it stops growing, and (when an
//! estimated total is configured) reports a completion percentage and an
//! ETA extrapolated from the average throughput so far. The observation
//! logic lives in [`ProgressState`], driven by one call per poll, so it can
//! be tested without threads or sleeps.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::ops::format_size;

use super::sleep_with_stop;

#[derive(Debug, Clone, Copy)]
pub struct ProgressSettings {
    pub poll_interval: Duration,
    pub log_interval: Duration,
    pub stagnation_threshold: Duration,
    pub estimated_total_bytes: Option<u64>,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            log_interval: Duration::from_secs(60),
            stagnation_threshold: Duration::from_secs(60),
            estimated_total_bytes: None,
        }
    }
}

/// What one poll decided to report, if anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressReport {
    Growing {
        bytes: u64,
        /// Only when an estimated total is configured; never decreases
        /// between reports.
        percent: Option<f64>,
        elapsed: Duration,
        remaining: Option<Duration>,
    },
    Stalled {
        stagnant: Duration,
    },
}

#[derive(Debug)]
pub struct ProgressState {
    settings: ProgressSettings,
    polls: u32,
    last_size: u64,
    stagnant: Duration,
    last_log_at: Option<Duration>,
    last_percent: f64,
}

impl ProgressState {
    pub fn new(settings: ProgressSettings) -> Self {
        Self {
            settings,
            polls: 0,
            last_size: 0,
            stagnant: Duration::ZERO,
            last_log_at: None,
            last_percent: 0.0,
        }
    }

    /// Feed one poll observation. `None` means the file does not exist yet,
    /// which is silently ignored.
    pub fn observe(&mut self, size: Option<u64>) -> Option<ProgressReport> {
        self.polls += 1;
        let now = self.settings.poll_interval * self.polls;
        let size = size?;

        let log_due = match self.last_log_at {
            None => true,
            Some(at) => now - at >= self.settings.log_interval,
        };

        let report = if size == self.last_size {
            self.stagnant += self.settings.poll_interval;
            (self.stagnant >= self.settings.stagnation_threshold && log_due).then_some(
                ProgressReport::Stalled {
                    stagnant: self.stagnant,
                },
            )
        } else {
            self.stagnant = Duration::ZERO;
            log_due.then(|| {
                let percent = self.settings.estimated_total_bytes.map(|total| {
                    let raw = if total == 0 {
                        100.0
                    } else {
                        size as f64 / total as f64 * 100.0
                    };
                    raw.min(100.0).max(self.last_percent)
                });
                if let Some(p) = percent {
                    self.last_percent = p;
                }
                let remaining = self.settings.estimated_total_bytes.and_then(|total| {
                    if size == 0 || total <= size {
                        return None;
                    }
                    let rate = size as f64 / now.as_secs_f64();
                    Some(Duration::from_secs_f64((total - size) as f64 / rate))
                });
                ProgressReport::Growing {
                    bytes: size,
                    percent,
                    elapsed: now,
                    remaining,
                }
            })
        };

        if report.is_some() {
            self.last_log_at = Some(now);
        }
        self.last_size = size;
        report
    }
}

/// Polling loop run on the progress monitor thread.
pub fn progress_loop(dump_file: &Path, settings: ProgressSettings, stop: &AtomicBool) {
    info!("Monitoring database dump progress: {}", dump_file.display());
    let mut state = ProgressState::new(settings);

    while !stop.load(Ordering::Relaxed) {
        let size = fs::metadata(dump_file).ok().map(|m| m.len());
        match state.observe(size) {
            Some(ProgressReport::Growing {
                bytes,
                percent,
                elapsed,
                remaining,
            }) => match (percent, remaining) {
                (Some(p), Some(eta)) => info!(
                    "Database dump progress: {} ({:.1}% after {}s, ~{}s remaining)",
                    format_size(bytes),
                    p,
                    elapsed.as_secs(),
                    eta.as_secs()
                ),
                (Some(p), None) => info!(
                    "Database dump progress: {} ({:.1}% after {}s)",
                    format_size(bytes),
                    p,
                    elapsed.as_secs()
                ),
                _ => info!("Database dump progress: {}", format_size(bytes)),
            },
            Some(ProgressReport::Stalled { stagnant }) => warn!(
                "Database dump file size hasn't changed for {} seconds. Possible stall?",
                stagnant.as_secs()
            ),
            None => {}
        }
        sleep_with_stop(stop, settings.poll_interval);
    }

    info!("Database dump monitoring stopped.");
}
