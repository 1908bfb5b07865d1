//! Shared error type across jdbcmetrics crates.

use thiserror::Error;

/// Boxed error returned by plugin constructors and `configure` calls.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and runtime.
///
/// Every plugin variant carries the offending identifier so operators can
/// fix the configuration from the message alone.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("MetricsConfigurator [{id}] not found")]
    PluginNotFound { id: String },

    #[error("MetricsConfigurator [{id}] is of type [{type_name}], which does not implement MetricsConfigurator")]
    InvalidPluginType { id: String, type_name: String },

    #[error("MetricsConfigurator [{id}] cannot be instantiated: {source}")]
    PluginInstantiation {
        id: String,
        #[source]
        source: BoxError,
    },

    #[error("MetricsConfigurator [{id}] failed to configure the registry: {source}")]
    PluginConfigure {
        id: String,
        #[source]
        source: BoxError,
    },

    #[error("metric {name} is already registered as a {existing}, not a {requested}")]
    MetricKindMismatch {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u32),

    #[error("metrics registry already initialized")]
    AlreadyInitialized,
}

impl MetricsError {
    /// Identifier of the plugin involved, if this is a plugin failure.
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            MetricsError::PluginNotFound { id }
            | MetricsError::InvalidPluginType { id, .. }
            | MetricsError::PluginInstantiation { id, .. }
            | MetricsError::PluginConfigure { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Stable short name of the failure kind, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MetricsError::PluginNotFound { .. } => "plugin_not_found",
            MetricsError::InvalidPluginType { .. } => "invalid_plugin_type",
            MetricsError::PluginInstantiation { .. } => "plugin_instantiation",
            MetricsError::PluginConfigure { .. } => "plugin_configure",
            MetricsError::MetricKindMismatch { .. } => "metric_kind_mismatch",
            MetricsError::InvalidConfig(_) => "invalid_config",
            MetricsError::UnsupportedVersion(_) => "unsupported_version",
            MetricsError::AlreadyInitialized => "already_initialized",
        }
    }
}
