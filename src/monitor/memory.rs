// src/monitor/memory.rs

//! Memory pressure monitor.
//!
//! Polls system memory on a cadence that tightens as pressure rises. Each
//! state transition is logged once at entry and once at recovery; sustained
//! pressure only shows up in the per-poll debug line. The transition logic
//! lives in [`MemoryLevels`] so it can be exercised with synthetic samples.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sysinfo::System;
use tracing::{debug, error, info, warn};

use super::sleep_with_stop;

const AVAILABLE_CRITICAL_MB: u64 = 250;
const AVAILABLE_WARNING_MB: u64 = 500;
const FREE_CRITICAL_MB: u64 = 125;
const FREE_WARNING_MB: u64 = 250;

/// One point-in-time reading, in MB.
#[derive(Debug, Clone, Copy)]
pub struct MemorySample {
    pub total_mb: u64,
    pub used_mb: u64,
    pub free_mb: u64,
    pub buffers_cached_mb: u64,
    pub available_mb: u64,
}

impl MemorySample {
    pub fn capture(sys: &mut System) -> Self {
        sys.refresh_memory();
        let mb = |bytes: u64| bytes / (1024 * 1024);
        let total = mb(sys.total_memory());
        let used = mb(sys.used_memory());
        let free = mb(sys.free_memory());
        Self {
            total_mb: total,
            used_mb: used,
            free_mb: free,
            buffers_cached_mb: total.saturating_sub(used).saturating_sub(free),
            available_mb: mb(sys.available_memory()),
        }
    }
}

/// A state transition worth logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEvent {
    EnterCritical { available_mb: u64 },
    RecoverCritical { available_mb: u64 },
    EnterWarning { available_mb: u64 },
    RecoverWarning { available_mb: u64 },
    EnterLowFreeCritical { free_mb: u64, available_mb: u64 },
    RecoverLowFreeCritical { free_mb: u64 },
    EnterLowFreeWarning { free_mb: u64, available_mb: u64 },
    RecoverLowFreeWarning { free_mb: u64 },
}

/// Threshold state machine with explicit previous-state tracking, so each
/// dip produces exactly one entry event and one recovery event.
#[derive(Debug, Default)]
pub struct MemoryLevels {
    critical: bool,
    warning: bool,
    low_free_critical: bool,
    low_free_warning: bool,
}

impl MemoryLevels {
    /// Feed one sample; returns the transitions it caused plus the cadence
    /// until the next poll.
    pub fn observe(&mut self, s: &MemorySample) -> (Vec<MemoryEvent>, Duration) {
        let mut events = Vec::new();

        if s.available_mb < AVAILABLE_CRITICAL_MB {
            if !self.critical {
                events.push(MemoryEvent::EnterCritical {
                    available_mb: s.available_mb,
                });
            }
            self.critical = true;
        } else if self.critical {
            events.push(MemoryEvent::RecoverCritical {
                available_mb: s.available_mb,
            });
            self.critical = false;
        }

        if s.available_mb < AVAILABLE_WARNING_MB {
            // entry is suppressed while already in the worse critical state
            if !self.warning && !self.critical {
                events.push(MemoryEvent::EnterWarning {
                    available_mb: s.available_mb,
                });
            }
            self.warning = true;
        } else if self.warning {
            events.push(MemoryEvent::RecoverWarning {
                available_mb: s.available_mb,
            });
            self.warning = false;
        }

        if s.free_mb < FREE_CRITICAL_MB && s.available_mb > AVAILABLE_WARNING_MB {
            if !self.low_free_critical {
                events.push(MemoryEvent::EnterLowFreeCritical {
                    free_mb: s.free_mb,
                    available_mb: s.available_mb,
                });
            }
            self.low_free_critical = true;
        } else if self.low_free_critical && s.free_mb >= FREE_CRITICAL_MB {
            events.push(MemoryEvent::RecoverLowFreeCritical { free_mb: s.free_mb });
            self.low_free_critical = false;
        }

        if s.free_mb < FREE_WARNING_MB && s.available_mb > AVAILABLE_WARNING_MB {
            if !self.low_free_warning {
                events.push(MemoryEvent::EnterLowFreeWarning {
                    free_mb: s.free_mb,
                    available_mb: s.available_mb,
                });
            }
            self.low_free_warning = true;
        } else if self.low_free_warning && s.free_mb >= FREE_WARNING_MB {
            events.push(MemoryEvent::RecoverLowFreeWarning { free_mb: s.free_mb });
            self.low_free_warning = false;
        }

        (events, self.cadence())
    }

    /// Poll cadence for the current state: the tighter the memory, the
    /// shorter the interval.
    pub fn cadence(&self) -> Duration {
        if self.critical || self.low_free_critical {
            Duration::from_millis(500)
        } else if self.warning {
            Duration::from_secs(1)
        } else if self.low_free_warning {
            Duration::from_secs(2)
        } else {
            Duration::from_secs(5)
        }
    }
}

fn log_event(event: &MemoryEvent) {
    match event {
        MemoryEvent::EnterCritical { available_mb } => error!(
            "CRITICAL MEMORY WARNING: Available memory critically low ({available_mb} MB)! System may soon become unstable."
        ),
        MemoryEvent::RecoverCritical { available_mb } => error!(
            "RECOVERY: Available memory recovered to {available_mb} MB from a critical state."
        ),
        MemoryEvent::EnterWarning { available_mb } => warn!(
            "LOW MEMORY WARNING: Available memory below {AVAILABLE_WARNING_MB} MB ({available_mb} MB). Performance may degrade."
        ),
        MemoryEvent::RecoverWarning { available_mb } => info!(
            "RECOVERY: Available memory recovered to {available_mb} MB, above warning threshold."
        ),
        MemoryEvent::EnterLowFreeCritical {
            free_mb,
            available_mb,
        } => error!(
            "LOW FREE MEMORY: Free memory is {free_mb} MB, but available memory is sufficient ({available_mb} MB)."
        ),
        MemoryEvent::RecoverLowFreeCritical { free_mb } => {
            warn!("RECOVERY: Free memory increased to {free_mb} MB from a critical state.")
        }
        MemoryEvent::EnterLowFreeWarning {
            free_mb,
            available_mb,
        } => warn!(
            "LOW FREE MEMORY: Free memory is {free_mb} MB, but available memory is sufficient ({available_mb} MB)."
        ),
        MemoryEvent::RecoverLowFreeWarning { free_mb } => {
            info!("RECOVERY: Free memory increased to {free_mb} MB.")
        }
    }
}

/// Polling loop run on the memory monitor thread.
pub fn memory_loop(stop: &AtomicBool) {
    let mut sys = System::new();
    let mut levels = MemoryLevels::default();

    while !stop.load(Ordering::Relaxed) {
        let sample = MemorySample::capture(&mut sys);
        let (events, cadence) = levels.observe(&sample);
        for event in &events {
            log_event(event);
        }
        debug!(
            "Memory stats | Total: {} MB | Used: {} MB | Free: {} MB | Buffers/Cached: {} MB | Available: {} MB",
            sample.total_mb,
            sample.used_mb,
            sample.free_mb,
            sample.buffers_cached_mb,
            sample.available_mb
        );
        sleep_with_stop(stop, cadence);
    }

    info!("Memory monitoring stopped.");
}
