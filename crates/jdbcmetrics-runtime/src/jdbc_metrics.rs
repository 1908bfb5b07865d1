//! Process-wide holder of all JDBC metrics.
//!
//! Construction registers the fixed metric schema and then attaches every
//! configured reporter plugin. Any plugin failure aborts construction: a
//! loud startup failure is preferred over silently unreported metrics.
//!
//! The singleton is built at most once per process. The outcome of that one
//! attempt (success or failure) is kept and handed to every later caller.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use jdbcmetrics_core::error::{MetricsError, Result};
use jdbcmetrics_core::{Counter, Histogram, Meter, MetricName, MetricsRegistry, Timer};

use crate::config::{self, MetricsConfig};
use crate::plugin::PluginCatalog;

pub const GROUP: &str = "jdbc";
pub const TYPE_READ: &str = "read";
pub const TYPE_WRITE: &str = "write";

/// Outcome of the one-time construction.
pub type InitResult = std::result::Result<&'static JdbcMetrics, &'static MetricsError>;

static INSTANCE: OnceLock<Result<JdbcMetrics>> = OnceLock::new();
static ALREADY_INITIALIZED: MetricsError = MetricsError::AlreadyInitialized;

pub struct JdbcMetrics {
    registry: Arc<MetricsRegistry>,
    total_number_of_reads: Arc<Counter>,
    total_number_of_writes: Arc<Counter>,
    read_counts_per_request: Arc<Histogram>,
    write_counts_per_request: Arc<Histogram>,
    read_meter: Arc<Meter>,
    write_meter: Arc<Meter>,
    read_timer: Arc<Timer>,
    write_timer: Arc<Timer>,
    configurators: Vec<String>,
}

impl JdbcMetrics {
    /// The process-wide instance, built from the environment on first call.
    ///
    /// Concurrent first callers block until construction finishes. If
    /// construction failed, every call returns that same error.
    pub fn instance() -> InitResult {
        INSTANCE
            .get_or_init(|| {
                config::from_env().and_then(|cfg| Self::build(&cfg, PluginCatalog::global()))
            })
            .as_ref()
    }

    /// Build the process-wide instance from an explicit config.
    ///
    /// Fails with [`MetricsError::AlreadyInitialized`] if the instance was
    /// already built, by this function or by [`JdbcMetrics::instance`].
    pub fn initialize(cfg: MetricsConfig) -> InitResult {
        let mut ran = false;
        let outcome = INSTANCE.get_or_init(|| {
            ran = true;
            Self::build(&cfg, PluginCatalog::global())
        });
        if !ran {
            return Err(&ALREADY_INITIALIZED);
        }
        outcome.as_ref()
    }

    /// The instance if it was built successfully; never triggers a build.
    pub fn get() -> Option<&'static JdbcMetrics> {
        INSTANCE.get().and_then(|r| r.as_ref().ok())
    }

    /// Build a standalone (non-global) instance.
    pub fn build(cfg: &MetricsConfig, catalog: &PluginCatalog) -> Result<Self> {
        Self::build_with_registry(cfg, catalog, Arc::new(MetricsRegistry::new()))
    }

    /// Build on top of a caller-supplied registry (e.g. one with a manual clock).
    pub fn build_with_registry(
        cfg: &MetricsConfig,
        catalog: &PluginCatalog,
        registry: Arc<MetricsRegistry>,
    ) -> Result<Self> {
        cfg.validate()?;

        let read = |name: &str| MetricName::new(GROUP, TYPE_READ, name);
        let write = |name: &str| MetricName::new(GROUP, TYPE_WRITE, name);
        let seconds = Duration::from_secs(1);
        let millis = Duration::from_millis(1);

        let mut metrics = Self {
            total_number_of_reads: registry.new_counter(read("total-of-reads"))?,
            total_number_of_writes: registry.new_counter(write("total-of-writes"))?,
            read_counts_per_request: registry.new_histogram(read("read-counts-per-request"), true)?,
            write_counts_per_request: registry
                .new_histogram(write("write-counts-per-request"), true)?,
            read_meter: registry.new_meter(read("reads"), "jdbcread", seconds)?,
            write_meter: registry.new_meter(write("writes"), "jdbcwrite", seconds)?,
            read_timer: registry.new_timer(read("read-time"), millis, seconds)?,
            write_timer: registry.new_timer(write("write-time"), millis, seconds)?,
            registry,
            configurators: Vec::new(),
        };
        tracing::debug!(metrics = metrics.registry.len(), group = GROUP, "jdbc metric schema registered");

        let Some(list) = cfg.configurators() else {
            tracing::debug!("no metrics configurators configured; metrics are not reported");
            return Ok(metrics);
        };

        if let Err(e) = catalog.configure_all(list, &metrics.registry) {
            tracing::error!(
                plugin = e.plugin_id().unwrap_or_default(),
                kind = e.kind(),
                error = %e,
                "metrics configuration failed"
            );
            return Err(e);
        }
        metrics.configurators = list.split(',').map(str::to_string).collect();
        Ok(metrics)
    }

    pub fn total_number_of_reads(&self) -> &Arc<Counter> {
        &self.total_number_of_reads
    }

    pub fn total_number_of_writes(&self) -> &Arc<Counter> {
        &self.total_number_of_writes
    }

    pub fn read_counts_per_request(&self) -> &Arc<Histogram> {
        &self.read_counts_per_request
    }

    pub fn write_counts_per_request(&self) -> &Arc<Histogram> {
        &self.write_counts_per_request
    }

    pub fn read_meter(&self) -> &Arc<Meter> {
        &self.read_meter
    }

    pub fn write_meter(&self) -> &Arc<Meter> {
        &self.write_meter
    }

    pub fn read_timer(&self) -> &Arc<Timer> {
        &self.read_timer
    }

    pub fn write_timer(&self) -> &Arc<Timer> {
        &self.write_timer
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    /// Identifiers of the configurators attached during construction.
    pub fn configurators(&self) -> &[String] {
        &self.configurators
    }
}
