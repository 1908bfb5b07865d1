use std::sync::atomic::{AtomicI64, Ordering};

/// Incrementing and decrementing counter.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by 1.
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Increment by an arbitrary value.
    pub fn inc_by(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Decrement by 1.
    pub fn dec(&self) {
        self.dec_by(1);
    }

    pub fn dec_by(&self, n: i64) {
        self.count.fetch_sub(n, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Reset to zero.
    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}
