//! External cancellation and deadlines for a running query.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Thread-safe stop flag with an optional deadline.
///
/// Clones share the same flag, so a caller can keep one clone and call
/// [`StopSignal::stop`] while the search polls another.
#[derive(Debug, Clone)]
pub struct StopSignal {
    /// Shared stop flag
    stopped: Arc<AtomicBool>,
    /// When the query started
    start_time: Arc<RwLock<Option<Instant>>>,
    /// Wall-clock budget for the query (None = unlimited)
    time_limit: Option<Duration>,
}

impl StopSignal {
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            start_time: Arc::new(RwLock::new(None)),
            time_limit,
        }
    }

    /// Start the clock and clear any earlier stop request.
    pub fn start(&self) {
        *self.start_time.write() = Some(Instant::now());
        self.stopped.store(false, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Whether the search should stop, tripping the flag once the deadline passes.
    pub fn check(&self) -> bool {
        if self.is_stopped() {
            return true;
        }
        if let (Some(limit), Some(start)) = (self.time_limit, *self.start_time.read()) {
            if start.elapsed() >= limit {
                self.stop();
                return true;
            }
        }
        false
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time
            .read()
            .map(|s| s.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Time left before the deadline (None if no limit).
    pub fn remaining(&self) -> Option<Duration> {
        let limit = self.time_limit?;
        Some(limit.saturating_sub(self.elapsed()))
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod stop_tests;
