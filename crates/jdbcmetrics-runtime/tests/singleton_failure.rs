//! A failed construction is kept: the process never gets a usable instance.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use jdbcmetrics_core::MetricsError;
use jdbcmetrics_runtime::config::MetricsConfig;
use jdbcmetrics_runtime::JdbcMetrics;

#[test]
fn failed_construction_is_sticky() {
    let cfg = MetricsConfig::with_configurators("pkg.DoesNotExist");
    let err = JdbcMetrics::initialize(cfg).err().expect("must fail");
    assert!(matches!(err, MetricsError::PluginNotFound { id } if id == "pkg.DoesNotExist"));

    let later = JdbcMetrics::instance().err().expect("still failed");
    assert!(std::ptr::eq(err, later));
    assert!(JdbcMetrics::get().is_none());
}
