use serde::Deserialize;
use jdbcmetrics_core::error::{MetricsError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    pub version: u32,

    /// Comma-separated reporter plugin identifiers.
    #[serde(default)]
    pub metrics_configurators: Option<String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            version: 1,
            metrics_configurators: None,
        }
    }
}

impl MetricsConfig {
    /// Config with the given configurator list and nothing else.
    pub fn with_configurators(list: impl Into<String>) -> Self {
        Self {
            metrics_configurators: Some(list.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MetricsError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// The configurator list, or `None` when absent or empty.
    pub fn configurators(&self) -> Option<&str> {
        self.metrics_configurators
            .as_deref()
            .filter(|s| !s.is_empty())
    }
}
