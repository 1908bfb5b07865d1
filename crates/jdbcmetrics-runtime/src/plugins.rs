//! Built-in reporter plugins.
//!
//! `LogConfigurator` periodically writes the whole registry to the `tracing`
//! pipeline, either as Prometheus-style text or as one JSON document. It is
//! registered in [`crate::PluginCatalog::global`] under
//! `jdbcmetrics_runtime::plugins::LogConfigurator`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use jdbcmetrics_core::error::MetricsError;
use jdbcmetrics_core::{BoxError, MetricsRegistry};

use crate::plugin::MetricsConfigurator;

/// Reporting interval in milliseconds.
pub const LOG_INTERVAL_ENV: &str = "JDBCMETRICS_LOG_INTERVAL_MS";
/// `text` or `json`.
pub const LOG_FORMAT_ENV: &str = "JDBCMETRICS_LOG_FORMAT";

const DEFAULT_INTERVAL_MS: u64 = 60_000;
const MIN_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfigurator {
    interval: Duration,
    format: LogFormat,
}

impl LogConfigurator {
    pub fn new(interval: Duration, format: LogFormat) -> Self {
        Self { interval, format }
    }

    /// Zero-argument constructor used by the plugin catalog.
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_ms = match lookup(LOG_INTERVAL_ENV) {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                MetricsError::InvalidConfig(format!("{LOG_INTERVAL_ENV}={raw:?}: {e}"))
            })?,
            None => DEFAULT_INTERVAL_MS,
        };
        if interval_ms < MIN_INTERVAL_MS {
            return Err(MetricsError::InvalidConfig(format!(
                "{LOG_INTERVAL_ENV} must be at least {MIN_INTERVAL_MS}, got {interval_ms}"
            ))
            .into());
        }

        let format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) => LogFormat::parse(&raw).ok_or_else(|| {
                MetricsError::InvalidConfig(format!("{LOG_FORMAT_ENV} must be text or json, got {raw:?}"))
            })?,
            None => LogFormat::Text,
        };

        Ok(Self::new(Duration::from_millis(interval_ms), format))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }
}

impl MetricsConfigurator for LogConfigurator {
    fn configure(&self, registry: &Arc<MetricsRegistry>) -> Result<(), BoxError> {
        let reporter = LogReporter::new(Arc::clone(registry), self.format);
        let interval = self.interval;
        thread::Builder::new()
            .name("jdbcmetrics-log-reporter".into())
            .spawn(move || loop {
                thread::sleep(interval);
                reporter.report();
            })?;
        tracing::info!(interval_ms = interval.as_millis() as u64, format = ?self.format, "log reporter started");
        Ok(())
    }
}

/// Renders a registry and writes it to the log.
pub struct LogReporter {
    registry: Arc<MetricsRegistry>,
    format: LogFormat,
}

impl LogReporter {
    pub fn new(registry: Arc<MetricsRegistry>, format: LogFormat) -> Self {
        Self { registry, format }
    }

    pub fn render(&self) -> Result<String, serde_json::Error> {
        match self.format {
            LogFormat::Text => Ok(self.registry.render_text()),
            LogFormat::Json => serde_json::to_string(&self.registry.snapshot()),
        }
    }

    /// Log one report; rendering failures are logged, not propagated.
    pub fn report(&self) {
        match self.render() {
            Ok(body) => tracing::info!(target: "jdbcmetrics::report", metrics = self.registry.len(), "\n{body}"),
            Err(e) => tracing::warn!(error = %e, "metrics report rendering failed"),
        }
    }
}
