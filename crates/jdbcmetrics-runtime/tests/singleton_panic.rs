//! A plugin that panics while attaching fails construction like any other
//! plugin error, and the failure is kept.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jdbcmetrics_core::{BoxError, MetricsError, MetricsRegistry};
use jdbcmetrics_runtime::config::MetricsConfig;
use jdbcmetrics_runtime::{JdbcMetrics, MetricsConfigurator, PluginCatalog};

static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct PanicsOnConfigure;

impl MetricsConfigurator for PanicsOnConfigure {
    fn configure(&self, _registry: &Arc<MetricsRegistry>) -> Result<(), BoxError> {
        ATTEMPTS.fetch_add(1, Ordering::SeqCst);
        panic!("exporter socket closed");
    }
}

#[test]
fn panicking_plugin_fails_construction_once() {
    PluginCatalog::global().register_as::<PanicsOnConfigure>("test.PanicsOnConfigure");

    let cfg = MetricsConfig::with_configurators("test.PanicsOnConfigure");
    let err = JdbcMetrics::initialize(cfg).err().expect("must fail");
    assert_eq!(err.kind(), "plugin_configure");
    assert_eq!(err.plugin_id(), Some("test.PanicsOnConfigure"));
    assert!(err.to_string().contains("exporter socket closed"));

    let again = JdbcMetrics::initialize(MetricsConfig::with_configurators("test.PanicsOnConfigure"))
        .err()
        .expect("already built");
    assert!(matches!(again, MetricsError::AlreadyInitialized));

    let later = JdbcMetrics::instance().err().expect("still failed");
    assert!(std::ptr::eq(err, later));
    assert!(JdbcMetrics::get().is_none());
    assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 1);
}
