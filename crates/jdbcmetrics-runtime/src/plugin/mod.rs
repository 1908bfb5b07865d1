//! Reporter plugins.
//!
//! A reporter plugin is any type implementing [`MetricsConfigurator`]. Plugins
//! are looked up by identifier in a [`PluginCatalog`] when the
//! [`crate::JdbcMetrics`] singleton is built.

pub mod catalog;

use std::sync::Arc;

use jdbcmetrics_core::{BoxError, MetricsRegistry};

pub use catalog::PluginCatalog;

/// Configure reporting for a registry.
///
/// Called once per identifier in the configurator list, after every schema
/// metric is registered. An implementation may expose the metrics through a
/// management interface, start a reporting thread, add a registry listener,
/// and so on. The registry does not track plugins after this call, and
/// several plugins may attach to the same registry.
pub trait MetricsConfigurator: Send + Sync {
    fn configure(&self, registry: &Arc<MetricsRegistry>) -> Result<(), BoxError>;
}
