//! Time source for rate and decay computations.
//!
//! Meters and decaying samples read time through [`Clock`] so tests can drive
//! them deterministically with [`ManualClock`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Monotonic nanosecond clock.
pub trait Clock: Send + Sync {
    /// Nanoseconds since an arbitrary fixed origin.
    fn tick(&self) -> u64;

    /// Wall-clock-ish seconds, used for decay landmarks.
    fn time_secs(&self) -> u64 {
        self.tick() / 1_000_000_000
    }
}

/// Process monotonic clock backed by `Instant`.
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn tick(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Shared default clock.
pub fn default_clock() -> Arc<dyn Clock> {
    static DEFAULT: OnceLock<Arc<MonotonicClock>> = OnceLock::new();
    DEFAULT.get_or_init(|| Arc::new(MonotonicClock::new())).clone()
}

/// Clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn tick(&self) -> u64 {
        self.nanos.load(Ordering::SeqCst)
    }
}
