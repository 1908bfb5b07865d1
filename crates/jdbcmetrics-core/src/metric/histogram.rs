//! Running distribution of values.
//!
//! Count, min, max and sum are tracked with atomics; the variance uses
//! Welford's algorithm behind a short lock; quantiles come from the
//! pluggable [`Sample`].

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::metric::sample::{
    ExpDecaySample, Sample, Snapshot, UniformSample, DEFAULT_ALPHA, DEFAULT_RESERVOIR_SIZE,
};

#[derive(Default)]
struct Welford {
    n: u64,
    mean: f64,
    m2: f64,
}

pub struct Histogram {
    sample: Box<dyn Sample>,
    biased: bool,
    count: AtomicU64,
    min: AtomicI64,
    max: AtomicI64,
    sum: AtomicI64,
    variance: Mutex<Welford>,
}

impl Histogram {
    pub fn new(sample: Box<dyn Sample>, biased: bool) -> Self {
        Self {
            sample,
            biased,
            count: AtomicU64::new(0),
            min: AtomicI64::new(i64::MAX),
            max: AtomicI64::new(i64::MIN),
            sum: AtomicI64::new(0),
            variance: Mutex::new(Welford::default()),
        }
    }

    /// Histogram over a uniform reservoir.
    pub fn uniform() -> Self {
        Self::new(Box::new(UniformSample::new(DEFAULT_RESERVOIR_SIZE)), false)
    }

    /// Histogram over an exponentially decaying reservoir.
    pub fn biased() -> Self {
        Self::new(
            Box::new(ExpDecaySample::new(DEFAULT_RESERVOIR_SIZE, DEFAULT_ALPHA)),
            true,
        )
    }

    pub fn biased_with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Box::new(ExpDecaySample::with_clock(DEFAULT_RESERVOIR_SIZE, DEFAULT_ALPHA, clock)),
            true,
        )
    }

    /// `true` for the decaying sample, `false` for uniform.
    pub fn is_biased(&self) -> bool {
        self.biased
    }

    /// Record one value.
    pub fn update(&self, value: i64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sample.update(value);
        self.min.fetch_min(value, Ordering::Relaxed);
        self.max.fetch_max(value, Ordering::Relaxed);
        // saturate instead of wrapping; timers clamp huge durations to i64::MAX
        let _ = self
            .sum
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| Some(s.saturating_add(value)));

        let mut w = self.variance.lock();
        w.n += 1;
        let delta = value as f64 - w.mean;
        w.mean += delta / w.n as f64;
        w.m2 += delta * (value as f64 - w.mean);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Smallest recorded value, 0 when empty.
    pub fn min(&self) -> i64 {
        if self.count() == 0 {
            return 0;
        }
        self.min.load(Ordering::Relaxed)
    }

    /// Largest recorded value, 0 when empty.
    pub fn max(&self) -> i64 {
        if self.count() == 0 {
            return 0;
        }
        self.max.load(Ordering::Relaxed)
    }

    /// Sum of recorded values, saturating at the `i64` bounds.
    pub fn sum(&self) -> i64 {
        self.sum.load(Ordering::Relaxed)
    }

    /// Arithmetic mean, 0 when empty.
    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        self.sum() as f64 / count as f64
    }

    /// Sample standard deviation, 0 with fewer than two values.
    pub fn std_dev(&self) -> f64 {
        let w = self.variance.lock();
        if w.n < 2 {
            return 0.0;
        }
        (w.m2 / (w.n - 1) as f64).max(0.0).sqrt()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.sample.snapshot()
    }

    pub fn clear(&self) {
        let mut w = self.variance.lock();
        self.sample.clear();
        self.count.store(0, Ordering::Relaxed);
        self.min.store(i64::MAX, Ordering::Relaxed);
        self.max.store(i64::MIN, Ordering::Relaxed);
        self.sum.store(0, Ordering::Relaxed);
        *w = Welford::default();
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("biased", &self.biased)
            .field("count", &self.count())
            .finish()
    }
}
