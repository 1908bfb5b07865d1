use std::sync::Arc;
use std::time::Duration;

use crate::clock::{default_clock, Clock};
use crate::metric::histogram::Histogram;
use crate::metric::meter::Meter;
use crate::metric::sample::Snapshot;

/// Duration distribution plus call rate.
///
/// Durations are stored in nanoseconds and reported in `duration_unit`;
/// rates are reported in `rate_unit`.
pub struct Timer {
    duration_unit: Duration,
    rate_unit: Duration,
    meter: Meter,
    histogram: Histogram,
}

impl Timer {
    pub fn new(duration_unit: Duration, rate_unit: Duration) -> Self {
        Self::with_clock(duration_unit, rate_unit, default_clock())
    }

    pub fn with_clock(duration_unit: Duration, rate_unit: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            duration_unit,
            rate_unit,
            meter: Meter::with_clock("calls", rate_unit, clock.clone()),
            histogram: Histogram::biased_with_clock(clock),
        }
    }

    pub fn duration_unit(&self) -> Duration {
        self.duration_unit
    }

    pub fn rate_unit(&self) -> Duration {
        self.rate_unit
    }

    /// Record one call of the given duration.
    pub fn update(&self, duration: Duration) {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        self.histogram.update(nanos);
        self.meter.mark();
    }

    /// Run `f` and record how long it took.
    pub fn time<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let ctx = self.start();
        let out = f();
        ctx.stop();
        out
    }

    /// Start timing; the duration is recorded on [`TimerContext::stop`] or
    /// when the context is dropped.
    pub fn start(&self) -> TimerContext<'_> {
        TimerContext {
            timer: self,
            start: self.meter.clock().tick(),
            stopped: false,
        }
    }

    pub fn count(&self) -> u64 {
        self.histogram.count()
    }

    pub fn min(&self) -> f64 {
        self.scale(self.histogram.min() as f64)
    }

    pub fn max(&self) -> f64 {
        self.scale(self.histogram.max() as f64)
    }

    pub fn mean(&self) -> f64 {
        self.scale(self.histogram.mean())
    }

    pub fn std_dev(&self) -> f64 {
        self.scale(self.histogram.std_dev())
    }

    pub fn sum(&self) -> f64 {
        self.scale(self.histogram.sum() as f64)
    }

    /// Raw snapshot in nanoseconds; use [`Timer::scale`] to convert.
    pub fn snapshot(&self) -> Snapshot {
        self.histogram.snapshot()
    }

    /// Convert nanoseconds to the duration unit.
    pub fn scale(&self, nanos: f64) -> f64 {
        nanos / self.duration_unit.as_nanos().max(1) as f64
    }

    pub fn mean_rate(&self) -> f64 {
        self.meter.mean_rate()
    }

    pub fn one_minute_rate(&self) -> f64 {
        self.meter.one_minute_rate()
    }

    pub fn five_minute_rate(&self) -> f64 {
        self.meter.five_minute_rate()
    }

    pub fn fifteen_minute_rate(&self) -> f64 {
        self.meter.fifteen_minute_rate()
    }

    pub fn clear(&self) {
        self.histogram.clear();
        self.meter.clear();
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer")
            .field("duration_unit", &self.duration_unit)
            .field("rate_unit", &self.rate_unit)
            .field("count", &self.count())
            .finish()
    }
}

/// In-flight measurement started by [`Timer::start`].
pub struct TimerContext<'a> {
    timer: &'a Timer,
    start: u64,
    stopped: bool,
}

impl TimerContext<'_> {
    /// Record the elapsed time and return it.
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        self.stopped = true;
        let elapsed = self.timer.meter.clock().tick().saturating_sub(self.start);
        let elapsed = Duration::from_nanos(elapsed);
        self.timer.update(elapsed);
        elapsed
    }
}

impl Drop for TimerContext<'_> {
    fn drop(&mut self) {
        if !self.stopped {
            self.record();
        }
    }
}
