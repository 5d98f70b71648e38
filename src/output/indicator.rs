//! Activity indicator shown while waiting for the first response byte

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use tokio::task::AbortHandle;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// A spinner running on a background task until stopped.
///
/// The flag is the only state shared with the task. Stopping clears it,
/// erases the spinner line and aborts the task without waiting for it.
#[derive(Debug)]
pub struct ActivityIndicator {
    active: Arc<AtomicBool>,
    task: Option<AbortHandle>,
}

impl ActivityIndicator {
    /// Spawn the spinner on the current tokio runtime
    pub fn start() -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&active);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(FRAME_INTERVAL);
            for frame in FRAMES.iter().cycle() {
                interval.tick().await;
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                print!("\r{}", format!("⏺ Thinking {}", frame).dimmed());
                io::stdout().flush().ok();
            }
        });

        Self {
            active,
            task: Some(handle.abort_handle()),
        }
    }

    /// An indicator that never shows anything
    pub fn inactive() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Stop the spinner. Only the first call has any effect.
    pub fn stop(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(task) = &self.task {
            task.abort();
            print!("\r\x1b[2K");
            io::stdout().flush().ok();
        }
    }
}

impl Drop for ActivityIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}
