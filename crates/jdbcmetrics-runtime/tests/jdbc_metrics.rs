//! Schema registration, accessor identity and fail-fast construction on
//! standalone (non-global) instances.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use jdbcmetrics_core::{BoxError, Metric, MetricName, MetricsError, MetricsRegistry};
use jdbcmetrics_runtime::config::MetricsConfig;
use jdbcmetrics_runtime::{JdbcMetrics, MetricsConfigurator, PluginCatalog};

struct CountMetrics {
    seen: Arc<Mutex<Vec<usize>>>,
}

impl MetricsConfigurator for CountMetrics {
    fn configure(&self, registry: &Arc<MetricsRegistry>) -> Result<(), BoxError> {
        self.seen.lock().unwrap().push(registry.len());
        Ok(())
    }
}

fn build_plain() -> JdbcMetrics {
    JdbcMetrics::build(&MetricsConfig::default(), &PluginCatalog::new()).unwrap()
}

#[test]
fn registers_the_fixed_schema() {
    let metrics = build_plain();
    let registry = metrics.registry();
    assert_eq!(registry.len(), 8);

    let expect = [
        ("read", "total-of-reads", "counter"),
        ("write", "total-of-writes", "counter"),
        ("read", "read-counts-per-request", "histogram"),
        ("write", "write-counts-per-request", "histogram"),
        ("read", "reads", "meter"),
        ("write", "writes", "meter"),
        ("read", "read-time", "timer"),
        ("write", "write-time", "timer"),
    ];
    for (ty, name, kind) in expect {
        let metric = registry
            .get(&MetricName::new("jdbc", ty, name))
            .unwrap_or_else(|| panic!("missing jdbc.{ty}.{name}"));
        assert_eq!(metric.kind().as_str(), kind, "jdbc.{ty}.{name}");
    }

    assert!(metrics.read_counts_per_request().is_biased());
    assert!(metrics.write_counts_per_request().is_biased());
    assert_eq!(metrics.read_meter().event_type(), "jdbcread");
    assert_eq!(metrics.write_meter().event_type(), "jdbcwrite");
    assert_eq!(metrics.read_meter().rate_unit(), Duration::from_secs(1));
    assert_eq!(metrics.read_timer().duration_unit(), Duration::from_millis(1));
    assert_eq!(metrics.write_timer().rate_unit(), Duration::from_secs(1));
}

#[test]
fn accessors_return_registry_handles() {
    let metrics = build_plain();
    let name = MetricName::new("jdbc", "read", "total-of-reads");
    let Some(Metric::Counter(from_registry)) = metrics.registry().get(&name) else {
        panic!("total-of-reads must be a counter");
    };
    assert!(Arc::ptr_eq(metrics.total_number_of_reads(), &from_registry));
    assert!(Arc::ptr_eq(metrics.read_timer(), metrics.read_timer()));
}

#[test]
fn no_configurators_means_no_plugins() {
    let metrics = build_plain();
    assert!(metrics.configurators().is_empty());
}

#[test]
fn plugins_see_fully_populated_registry() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let catalog = PluginCatalog::new();
    for id in ["pkg.Valid", "pkg.Valid2"] {
        let seen = Arc::clone(&seen);
        catalog.register_with(id, move || Ok(CountMetrics { seen: Arc::clone(&seen) }));
    }

    let cfg = MetricsConfig::with_configurators("pkg.Valid,pkg.Valid2");
    let metrics = JdbcMetrics::build(&cfg, &catalog).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![8, 8]);
    assert_eq!(metrics.configurators(), ["pkg.Valid", "pkg.Valid2"]);
}

#[test]
fn unknown_plugin_fails_construction() {
    let cfg = MetricsConfig::with_configurators("pkg.DoesNotExist");
    let err = JdbcMetrics::build(&cfg, &PluginCatalog::new())
        .err()
        .expect("construction must fail");
    assert!(matches!(err, MetricsError::PluginNotFound { ref id } if id == "pkg.DoesNotExist"));
}

#[test]
fn invalid_plugin_type_fails_construction() {
    let catalog = PluginCatalog::new();
    catalog.register_type::<String>("pkg.JustAString");
    let cfg = MetricsConfig::with_configurators("pkg.JustAString");
    let err = JdbcMetrics::build(&cfg, &catalog).err().unwrap();
    assert_eq!(err.kind(), "invalid_plugin_type");
}

#[test]
fn concurrent_read_increments_are_exact() {
    let metrics = Arc::new(build_plain());
    let handles: Vec<_> = (0..100)
        .map(|_| {
            let m = Arc::clone(&metrics);
            thread::spawn(move || m.total_number_of_reads().inc())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(metrics.total_number_of_reads().count(), 100);
}

#[test]
fn request_count_histogram_round_trip() {
    let metrics = build_plain();
    let h = metrics.read_counts_per_request();
    h.update(12);
    assert_eq!(h.count(), 1);
    assert_eq!(h.min(), 12);
    assert_eq!(h.max(), 12);
    assert!((h.mean() - 12.0).abs() < f64::EPSILON);
}

#[test]
fn timer_and_meter_track_calls() {
    let metrics = build_plain();
    metrics.write_timer().update(Duration::from_millis(15));
    metrics.write_meter().mark_n(3);
    assert_eq!(metrics.write_timer().count(), 1);
    assert!((metrics.write_timer().max() - 15.0).abs() < 1e-9);
    assert_eq!(metrics.write_meter().count(), 3);
}
