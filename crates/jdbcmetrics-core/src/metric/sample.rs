//! Reservoir samples backing histograms.
//!
//! The sample decides which values a histogram remembers for quantiles.
//! [`UniformSample`] treats all values equally; [`ExpDecaySample`] favours
//! recent values (forward decay with a one-hour rescale), which is what the
//! "biased" request-count histograms use.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;

use crate::clock::{default_clock, Clock};

/// Default reservoir size, ~99.9% confidence of a 5% margin of error.
pub const DEFAULT_RESERVOIR_SIZE: usize = 1028;
/// Default decay factor; heavily biased to the last five minutes.
pub const DEFAULT_ALPHA: f64 = 0.015;

const RESCALE_THRESHOLD_NANOS: u64 = 60 * 60 * 1_000_000_000;

/// A statistically representative subset of a stream of values.
pub trait Sample: Send + Sync {
    fn update(&self, value: i64);

    /// Number of values currently held (at most the reservoir size).
    fn size(&self) -> usize;

    fn snapshot(&self) -> Snapshot;

    fn clear(&self);
}

/// Immutable, sorted view over a sample's values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: Vec<i64>,
}

impl Snapshot {
    pub fn new(mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Self { values }
    }

    /// Value at the given quantile in `[0.0, 1.0]`, linearly interpolated.
    /// An empty snapshot yields 0.
    pub fn value(&self, quantile: f64) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let q = quantile.clamp(0.0, 1.0);
        let pos = q * (self.values.len() + 1) as f64;
        if pos < 1.0 {
            return self.values[0] as f64;
        }
        if pos >= self.values.len() as f64 {
            return self.values[self.values.len() - 1] as f64;
        }
        let lower = self.values[pos as usize - 1] as f64;
        let upper = self.values[pos as usize] as f64;
        lower + (pos - pos.floor()) * (upper - lower)
    }

    pub fn median(&self) -> f64 {
        self.value(0.5)
    }

    pub fn p75(&self) -> f64 {
        self.value(0.75)
    }

    pub fn p95(&self) -> f64 {
        self.value(0.95)
    }

    pub fn p98(&self) -> f64 {
        self.value(0.98)
    }

    pub fn p99(&self) -> f64 {
        self.value(0.99)
    }

    pub fn p999(&self) -> f64 {
        self.value(0.999)
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }
}

/// Uniform reservoir using Vitter's Algorithm R.
pub struct UniformSample {
    reservoir_size: usize,
    count: AtomicU64,
    values: Mutex<Vec<i64>>,
}

impl UniformSample {
    pub fn new(reservoir_size: usize) -> Self {
        Self {
            reservoir_size: reservoir_size.max(1),
            count: AtomicU64::new(0),
            values: Mutex::new(Vec::with_capacity(reservoir_size.max(1))),
        }
    }
}

impl Default for UniformSample {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVOIR_SIZE)
    }
}

impl Sample for UniformSample {
    fn update(&self, value: i64) {
        let seen = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        let mut values = self.values.lock();
        if values.len() < self.reservoir_size {
            values.push(value);
            return;
        }
        let r = rand::thread_rng().gen_range(0..seen);
        if (r as usize) < self.reservoir_size {
            values[r as usize] = value;
        }
    }

    fn size(&self) -> usize {
        self.values.lock().len()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.values.lock().clone())
    }

    fn clear(&self) {
        let mut values = self.values.lock();
        values.clear();
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Priority key ordered by `f64::total_cmp`.
#[derive(Debug, Clone, Copy)]
struct Priority(f64);

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0.total_cmp(&other.0)
    }
}

struct DecayState {
    values: BTreeMap<Priority, i64>,
    /// Landmark, in clock seconds.
    start_time: u64,
    /// Next rescale, in clock nanos.
    next_scale_time: u64,
}

/// Exponentially decaying reservoir (forward decay).
///
/// Each value gets priority `exp(alpha * age_secs) / u` with `u` uniform in
/// `(0, 1]`; the reservoir keeps the highest priorities. Weights are rebased
/// to a new landmark every hour so they stay finite.
pub struct ExpDecaySample {
    reservoir_size: usize,
    alpha: f64,
    count: AtomicU64,
    state: Mutex<DecayState>,
    clock: Arc<dyn Clock>,
}

impl ExpDecaySample {
    pub fn new(reservoir_size: usize, alpha: f64) -> Self {
        Self::with_clock(reservoir_size, alpha, default_clock())
    }

    pub fn with_clock(reservoir_size: usize, alpha: f64, clock: Arc<dyn Clock>) -> Self {
        let state = DecayState {
            values: BTreeMap::new(),
            start_time: clock.time_secs(),
            next_scale_time: clock.tick().saturating_add(RESCALE_THRESHOLD_NANOS),
        };
        Self {
            reservoir_size: reservoir_size.max(1),
            alpha,
            count: AtomicU64::new(0),
            state: Mutex::new(state),
            clock,
        }
    }

    fn weight(&self, age_secs: u64) -> f64 {
        (self.alpha * age_secs as f64).exp()
    }

    fn rescale_if_needed(&self, state: &mut DecayState) {
        let now = self.clock.tick();
        if now < state.next_scale_time {
            return;
        }
        let old_start = state.start_time;
        state.start_time = self.clock.time_secs();
        state.next_scale_time = now.saturating_add(RESCALE_THRESHOLD_NANOS);
        let factor = (-self.alpha * state.start_time.saturating_sub(old_start) as f64).exp();
        let rescaled: BTreeMap<Priority, i64> = std::mem::take(&mut state.values)
            .into_iter()
            .map(|(k, v)| (Priority(k.0 * factor), v))
            .collect();
        self.count.store(rescaled.len() as u64, Ordering::Relaxed);
        state.values = rescaled;
        tracing::trace!(factor, size = state.values.len(), "decaying sample rescaled");
    }
}

impl Default for ExpDecaySample {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVOIR_SIZE, DEFAULT_ALPHA)
    }
}

impl Sample for ExpDecaySample {
    fn update(&self, value: i64) {
        let mut state = self.state.lock();
        self.rescale_if_needed(&mut state);

        let timestamp = self.clock.time_secs();
        let item_weight = self.weight(timestamp.saturating_sub(state.start_time));
        let u: f64 = 1.0 - rand::thread_rng().gen::<f64>();
        let priority = Priority(item_weight / u);

        let seen = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        if seen as usize <= self.reservoir_size {
            state.values.insert(priority, value);
            return;
        }

        let Some((&lowest, _)) = state.values.first_key_value() else {
            state.values.insert(priority, value);
            return;
        };
        if lowest < priority && state.values.insert(priority, value).is_none() {
            state.values.pop_first();
        }
    }

    fn size(&self) -> usize {
        self.state.lock().values.len()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.state.lock().values.values().copied().collect())
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.values.clear();
        state.start_time = self.clock.time_secs();
        state.next_scale_time = self.clock.tick().saturating_add(RESCALE_THRESHOLD_NANOS);
        self.count.store(0, Ordering::Relaxed);
    }
}
