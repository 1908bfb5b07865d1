//! Concurrent first callers: construction runs once and everyone gets the
//! same instance.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use jdbcmetrics_core::{BoxError, MetricsError, MetricsRegistry};
use jdbcmetrics_runtime::config::{MetricsConfig, CONFIGURATORS_ENV};
use jdbcmetrics_runtime::{JdbcMetrics, MetricsConfigurator, PluginCatalog};

const THREADS: usize = 16;

static CONFIGURED: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct SlowCounting;

impl MetricsConfigurator for SlowCounting {
    fn configure(&self, _registry: &Arc<MetricsRegistry>) -> Result<(), BoxError> {
        CONFIGURED.fetch_add(1, Ordering::SeqCst);
        // keep construction in flight while the other callers arrive
        thread::sleep(Duration::from_millis(50));
        Ok(())
    }
}

#[test]
fn concurrent_first_callers_build_once() {
    std::env::set_var(CONFIGURATORS_ENV, "test.SlowCounting");
    PluginCatalog::global().register_as::<SlowCounting>("test.SlowCounting");
    assert!(JdbcMetrics::get().is_none());

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    Some(JdbcMetrics::instance().unwrap() as *const JdbcMetrics as usize)
                } else {
                    let cfg = MetricsConfig::with_configurators("test.SlowCounting");
                    match JdbcMetrics::initialize(cfg) {
                        Ok(m) => Some(m as *const JdbcMetrics as usize),
                        Err(MetricsError::AlreadyInitialized) => None,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            })
        })
        .collect();
    let results: Vec<Option<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let m = JdbcMetrics::get().unwrap();
    let expected = m as *const JdbcMetrics as usize;
    let addrs: Vec<usize> = results.iter().flatten().copied().collect();
    assert!(addrs.len() >= THREADS / 2);
    assert!(addrs.iter().all(|a| *a == expected));
    // at most one initialize call can have performed the build
    let initialized = results.iter().skip(1).step_by(2).filter(|r| r.is_some()).count();
    assert!(initialized <= 1);

    assert_eq!(CONFIGURED.load(Ordering::SeqCst), 1);
    assert_eq!(m.configurators(), ["test.SlowCounting".to_string()]);
}
