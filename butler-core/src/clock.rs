//! Clock abstraction for start-timeout math
//!
//! Deadlines are stored as offsets from a monotonic reference captured once
//! per process, so a serialized `JobRun` stays meaningful no matter which
//! controller instance evaluates it.

use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// A monotonic clock measured from a fixed reference point
pub trait Clock: Clone + Send + Sync {
    /// Time elapsed since the reference point
    fn elapsed(&self) -> Duration;
}

static PROCESS_REFERENCE: OnceLock<Instant> = OnceLock::new();

/// Real clock, referenced to the first time any `SystemClock` is created
#[derive(Clone, Copy)]
pub struct SystemClock {
    reference: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            reference: *PROCESS_REFERENCE.get_or_init(Instant::now),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.reference.elapsed()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Default)]
pub struct FakeClock {
    elapsed: Arc<Mutex<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Set the elapsed time since the reference point
    pub fn set(&self, elapsed: Duration) {
        *self.elapsed.lock() = elapsed;
    }
}

impl Clock for FakeClock {
    fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}
