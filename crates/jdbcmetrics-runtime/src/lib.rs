//! jdbcmetrics runtime entry.
//!
//! This crate wires configuration, the reporter plugin catalog, and the
//! process-wide [`JdbcMetrics`] singleton on top of `jdbcmetrics-core`.
//! Instrumentation call sites only need [`JdbcMetrics::instance`] and the
//! accessors; reporter authors implement [`MetricsConfigurator`].

pub mod config;
pub mod jdbc_metrics;
pub mod plugin;
pub mod plugins;

pub use jdbc_metrics::JdbcMetrics;
pub use plugin::{MetricsConfigurator, PluginCatalog};
