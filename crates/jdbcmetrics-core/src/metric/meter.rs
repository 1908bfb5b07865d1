//! Rate-tracked event counter.
//!
//! A meter keeps a total count, a mean rate since creation, and 1/5/15 minute
//! exponentially weighted moving averages. The averages are ticked every
//! five seconds, lazily, by whichever thread reads or marks the meter first
//! after an interval boundary.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{default_clock, Clock};

const TICK_INTERVAL_NANOS: u64 = 5_000_000_000;
const TICK_INTERVAL_SECS: f64 = 5.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Exponentially weighted moving average over a fixed tick interval.
struct Ewma {
    alpha: f64,
    uncounted: AtomicU64,
    /// Rate in events per nanosecond, stored as `f64` bits.
    rate: AtomicU64,
    initialized: AtomicBool,
}

impl Ewma {
    fn for_minutes(minutes: f64) -> Self {
        let alpha = 1.0 - (-TICK_INTERVAL_SECS / SECONDS_PER_MINUTE / minutes).exp();
        Self {
            alpha,
            uncounted: AtomicU64::new(0),
            rate: AtomicU64::new(0f64.to_bits()),
            initialized: AtomicBool::new(false),
        }
    }

    fn update(&self, n: u64) {
        self.uncounted.fetch_add(n, Ordering::Relaxed);
    }

    /// Only one thread ticks at a time (guarded by the meter's last-tick CAS).
    fn tick(&self) {
        let count = self.uncounted.swap(0, Ordering::Relaxed);
        let instant_rate = count as f64 / TICK_INTERVAL_NANOS as f64;
        if self.initialized.load(Ordering::Acquire) {
            let rate = f64::from_bits(self.rate.load(Ordering::Relaxed));
            let next = rate + self.alpha * (instant_rate - rate);
            self.rate.store(next.to_bits(), Ordering::Relaxed);
        } else {
            self.rate.store(instant_rate.to_bits(), Ordering::Relaxed);
            self.initialized.store(true, Ordering::Release);
        }
    }

    fn rate(&self, unit: Duration) -> f64 {
        f64::from_bits(self.rate.load(Ordering::Relaxed)) * unit.as_nanos() as f64
    }

    fn reset(&self) {
        self.uncounted.store(0, Ordering::Relaxed);
        self.rate.store(0f64.to_bits(), Ordering::Relaxed);
        self.initialized.store(false, Ordering::Release);
    }
}

/// Meter measuring the rate of events over time.
pub struct Meter {
    event_type: String,
    rate_unit: Duration,
    count: AtomicU64,
    start_time: AtomicU64,
    last_tick: AtomicU64,
    m1: Ewma,
    m5: Ewma,
    m15: Ewma,
    clock: Arc<dyn Clock>,
}

impl Meter {
    /// `event_type` names what is being counted (`"jdbcread"`), `rate_unit`
    /// is the unit rates are reported in (one second for events/second).
    pub fn new(event_type: impl Into<String>, rate_unit: Duration) -> Self {
        Self::with_clock(event_type, rate_unit, default_clock())
    }

    pub fn with_clock(event_type: impl Into<String>, rate_unit: Duration, clock: Arc<dyn Clock>) -> Self {
        let now = clock.tick();
        Self {
            event_type: event_type.into(),
            rate_unit,
            count: AtomicU64::new(0),
            start_time: AtomicU64::new(now),
            last_tick: AtomicU64::new(now),
            m1: Ewma::for_minutes(1.0),
            m5: Ewma::for_minutes(5.0),
            m15: Ewma::for_minutes(15.0),
            clock,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn rate_unit(&self) -> Duration {
        self.rate_unit
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Mark one event.
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Mark `n` events.
    pub fn mark_n(&self, n: u64) {
        self.tick_if_necessary();
        self.count.fetch_add(n, Ordering::Relaxed);
        self.m1.update(n);
        self.m5.update(n);
        self.m15.update(n);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean rate since creation (or the last `clear`), in the rate unit.
    pub fn mean_rate(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let elapsed = self
            .clock
            .tick()
            .saturating_sub(self.start_time.load(Ordering::Relaxed));
        if elapsed == 0 {
            return 0.0;
        }
        count as f64 / elapsed as f64 * self.rate_unit.as_nanos() as f64
    }

    pub fn one_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m1.rate(self.rate_unit)
    }

    pub fn five_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m5.rate(self.rate_unit)
    }

    pub fn fifteen_minute_rate(&self) -> f64 {
        self.tick_if_necessary();
        self.m15.rate(self.rate_unit)
    }

    /// Reset counts and rates; the mean rate restarts from now.
    pub fn clear(&self) {
        let now = self.clock.tick();
        self.count.store(0, Ordering::Relaxed);
        self.start_time.store(now, Ordering::Relaxed);
        self.last_tick.store(now, Ordering::Relaxed);
        self.m1.reset();
        self.m5.reset();
        self.m15.reset();
    }

    fn tick_if_necessary(&self) {
        let old_tick = self.last_tick.load(Ordering::Relaxed);
        let new_tick = self.clock.tick();
        let age = new_tick.saturating_sub(old_tick);
        if age <= TICK_INTERVAL_NANOS {
            return;
        }
        let new_interval_start = new_tick - age % TICK_INTERVAL_NANOS;
        if self
            .last_tick
            .compare_exchange(old_tick, new_interval_start, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
        {
            let required = age / TICK_INTERVAL_NANOS;
            for _ in 0..required {
                self.m1.tick();
                self.m5.tick();
                self.m15.tick();
            }
        }
    }
}

impl std::fmt::Debug for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Meter")
            .field("event_type", &self.event_type)
            .field("rate_unit", &self.rate_unit)
            .field("count", &self.count())
            .finish()
    }
}
