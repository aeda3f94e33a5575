// src/monitor/mod.rs

//! Background monitors scoped to the database dump.
//!
//! Both monitors run on their own threads for exactly the duration of the
//! dump call and stop cooperatively via a shared flag; they must never
//! outlive the dump.

pub mod memory;
pub mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::info;

use self::progress::ProgressSettings;

/// Handle over the memory and dump-progress monitor threads.
pub struct DumpMonitor {
    stop: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl DumpMonitor {
    /// Start both monitor threads. The dump file may not exist yet; the
    /// progress monitor stays silent until it appears.
    pub fn start(dump_file: PathBuf, settings: ProgressSettings) -> Self {
        info!("Starting system monitoring...");
        let stop = Arc::new(AtomicBool::new(false));
        let mut threads = Vec::with_capacity(2);

        {
            let stop = Arc::clone(&stop);
            threads.push(thread::spawn(move || memory::memory_loop(&stop)));
        }
        {
            let stop = Arc::clone(&stop);
            threads.push(thread::spawn(move || {
                progress::progress_loop(&dump_file, settings, &stop)
            }));
        }

        Self { stop, threads }
    }

    /// Signal both threads and wait for them to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.threads.is_empty() {
            return;
        }
        info!("Stopping system monitoring...");
        self.stop.store(true, Ordering::Relaxed);
        for thread in self.threads.drain(..) {
            let _ = thread.join();
        }
    }
}

/// Unwinding out of the dump body must still reap the monitor threads;
/// leaked pollers would run for the rest of the process.
impl Drop for DumpMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sleep in short slices so a stop request is honoured promptly.
pub(crate) fn sleep_with_stop(stop: &AtomicBool, total: Duration) {
    const SLICE: Duration = Duration::from_millis(100);
    let mut remaining = total;
    while !stop.load(Ordering::Relaxed) && !remaining.is_zero() {
        let step = remaining.min(SLICE);
        thread::sleep(step);
        remaining -= step;
    }
}
