use std::any::{type_name, Any};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use jdbcmetrics_core::error::{MetricsError, Result};
use jdbcmetrics_core::{BoxError, MetricsRegistry};

use super::MetricsConfigurator;
use crate::plugins::LogConfigurator;

type Constructor = Arc<dyn Fn() -> std::result::Result<Box<dyn MetricsConfigurator>, BoxError> + Send + Sync>;

#[derive(Clone)]
struct PluginEntry {
    type_name: &'static str,
    /// `None` for types that are known but are not reporters.
    ctor: Option<Constructor>,
}

/// Identifier -> type table used to resolve configurator names.
///
/// Types are linked in statically and registered at startup, either under
/// their fully qualified Rust path (`register`) or under an explicit
/// identifier (`register_as`, `register_with`, `register_type`).
#[derive(Default)]
pub struct PluginCatalog {
    entries: DashMap<String, PluginEntry>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Process-wide catalog, seeded with the built-in configurators.
    pub fn global() -> &'static PluginCatalog {
        static GLOBAL: OnceLock<PluginCatalog> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let catalog = PluginCatalog::new();
            catalog.register_with(type_name::<LogConfigurator>(), LogConfigurator::from_env);
            catalog
        })
    }

    /// Register `T` under its fully qualified type name.
    pub fn register<T>(&self) -> &Self
    where
        T: MetricsConfigurator + Default + 'static,
    {
        self.register_as::<T>(type_name::<T>())
    }

    pub fn register_as<T>(&self, id: impl Into<String>) -> &Self
    where
        T: MetricsConfigurator + Default + 'static,
    {
        self.register_with::<T, _>(id, || Ok(T::default()))
    }

    /// Register a configurator built by a fallible zero-argument constructor.
    pub fn register_with<T, F>(&self, id: impl Into<String>, ctor: F) -> &Self
    where
        T: MetricsConfigurator + 'static,
        F: Fn() -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        let ctor: Constructor =
            Arc::new(move || ctor().map(|c| Box::new(c) as Box<dyn MetricsConfigurator>));
        self.insert(id.into(), PluginEntry {
            type_name: type_name::<T>(),
            ctor: Some(ctor),
        })
    }

    /// Register a type that is resolvable by name but is not a reporter.
    /// Naming it in the configurator list fails the capability check.
    pub fn register_type<T: 'static>(&self, id: impl Into<String>) -> &Self {
        self.insert(id.into(), PluginEntry {
            type_name: type_name::<T>(),
            ctor: None,
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Resolve, validate, instantiate and attach one configurator.
    ///
    /// A panic in the constructor or in `configure` is returned as
    /// `PluginInstantiation` or `PluginConfigure` respectively.
    pub fn resolve_and_configure(&self, id: &str, registry: &Arc<MetricsRegistry>) -> Result<()> {
        // clone out so no map guard is held while plugin code runs
        let entry = self
            .entries
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| MetricsError::PluginNotFound { id: id.to_string() })?;

        let ctor = entry.ctor.ok_or_else(|| MetricsError::InvalidPluginType {
            id: id.to_string(),
            type_name: entry.type_name.to_string(),
        })?;

        // plugin panics become errors; they must not unwind into the caller
        let configurator = catch_unwind(AssertUnwindSafe(|| ctor()))
            .unwrap_or_else(|payload| Err(panic_error(payload)))
            .map_err(|source| MetricsError::PluginInstantiation {
                id: id.to_string(),
                source,
            })?;

        catch_unwind(AssertUnwindSafe(|| configurator.configure(registry)))
            .unwrap_or_else(|payload| Err(panic_error(payload)))
            .map_err(|source| MetricsError::PluginConfigure {
                id: id.to_string(),
                source,
            })?;

        tracing::info!(plugin = %id, type_name = entry.type_name, "metrics configurator attached");
        Ok(())
    }

    /// Attach every configurator of a comma-separated list, in order.
    ///
    /// Stops at the first failure. Segments are not trimmed, so an empty
    /// segment is reported as an unknown (empty) identifier. Returns the
    /// number of configurators attached.
    pub fn configure_all(&self, list: &str, registry: &Arc<MetricsRegistry>) -> Result<usize> {
        if list.is_empty() {
            return Ok(0);
        }
        let mut attached = 0;
        for id in list.split(',') {
            self.resolve_and_configure(id, registry)?;
            attached += 1;
        }
        Ok(attached)
    }

    fn insert(&self, id: String, entry: PluginEntry) -> &Self {
        if let Some(prev) = self.entries.insert(id.clone(), entry) {
            tracing::warn!(plugin = %id, replaced = prev.type_name, "plugin identifier registered twice; keeping the latest");
        }
        self
    }
}

fn panic_error(payload: Box<dyn Any + Send>) -> BoxError {
    let msg = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("panicked: {msg}").into()
}
