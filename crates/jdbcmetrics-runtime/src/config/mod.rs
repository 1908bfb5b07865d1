//! Metrics config loader (strict parsing) and environment overrides.

pub mod schema;

use std::fs;

use jdbcmetrics_core::error::{MetricsError, Result};

pub use schema::MetricsConfig;

/// Path of an optional YAML config file.
pub const CONFIG_FILE_ENV: &str = "JDBCMETRICS_CONFIG";
/// Comma-separated configurator identifiers; overrides the file value.
pub const CONFIGURATORS_ENV: &str = "JDBCMETRICS_METRICS_CONFIGURATORS";

pub fn load_from_file(path: &str) -> Result<MetricsConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MetricsError::InvalidConfig(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<MetricsConfig> {
    let cfg: MetricsConfig = serde_yaml::from_str(s)
        .map_err(|e| MetricsError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Build the config from the process environment.
pub fn from_env() -> Result<MetricsConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build the config from an arbitrary variable lookup.
///
/// The file named by [`CONFIG_FILE_ENV`] is read first, if set; a set
/// [`CONFIGURATORS_ENV`] then replaces its configurator list.
pub fn from_lookup<F>(lookup: F) -> Result<MetricsConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match lookup(CONFIG_FILE_ENV) {
        Some(path) if !path.is_empty() => load_from_file(&path)?,
        _ => MetricsConfig::default(),
    };
    if let Some(list) = lookup(CONFIGURATORS_ENV) {
        tracing::debug!(env = CONFIGURATORS_ENV, configurators = %list, "configurator list from environment");
        cfg.metrics_configurators = Some(list);
    }
    Ok(cfg)
}
