//! Cooperative cancellation shared by the collector and the console threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Granularity of interruptible sleeps.
const SLEEP_STEP: Duration = Duration::from_millis(100);

/// Cloneable shutdown flag.
///
/// Every clone observes the same flag. Once triggered it stays triggered.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown of every holder of this token.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration`, waking early if shutdown is requested.
    ///
    /// Returns `true` if the full duration elapsed, `false` if the sleep
    /// was cut short (or never started) because of shutdown.
    pub fn sleep(&self, duration: Duration) -> bool {
        let mut remaining = duration;
        while remaining > Duration::ZERO {
            if self.is_triggered() {
                return false;
            }
            let step = remaining.min(SLEEP_STEP);
            thread::sleep(step);
            remaining = remaining.saturating_sub(step);
        }
        !self.is_triggered()
    }
}
