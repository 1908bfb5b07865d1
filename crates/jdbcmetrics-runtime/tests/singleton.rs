//! Process-wide instance lifecycle. Everything touching the global lives in
//! one test so ordering inside this binary is deterministic.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use jdbcmetrics_core::{BoxError, MetricsError, MetricsRegistry};
use jdbcmetrics_runtime::config::MetricsConfig;
use jdbcmetrics_runtime::{JdbcMetrics, MetricsConfigurator, PluginCatalog};

static CONFIGURED: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct CountingConfigurator;

impl MetricsConfigurator for CountingConfigurator {
    fn configure(&self, _registry: &Arc<MetricsRegistry>) -> Result<(), BoxError> {
        CONFIGURED.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn initialized_once_and_shared() {
    assert!(JdbcMetrics::get().is_none());

    PluginCatalog::global().register_as::<CountingConfigurator>("test.Counting");
    let cfg = MetricsConfig::with_configurators("test.Counting");
    let first = JdbcMetrics::initialize(cfg).unwrap();
    assert_eq!(CONFIGURED.load(Ordering::SeqCst), 1);

    let again = JdbcMetrics::initialize(MetricsConfig::default()).err().unwrap();
    assert!(matches!(again, MetricsError::AlreadyInitialized));

    let addrs: Vec<usize> = (0..16)
        .map(|_| thread::spawn(|| JdbcMetrics::instance().unwrap() as *const JdbcMetrics as usize))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();
    assert!(addrs.iter().all(|a| *a == first as *const JdbcMetrics as usize));
    assert_eq!(CONFIGURED.load(Ordering::SeqCst), 1);

    let same = JdbcMetrics::get().unwrap();
    assert!(Arc::ptr_eq(first.total_number_of_reads(), same.total_number_of_reads()));
    assert!(Arc::ptr_eq(first.registry(), same.registry()));
}
