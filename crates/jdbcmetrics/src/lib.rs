//! Top-level facade crate for jdbcmetrics.
//!
//! Re-exports the metric primitives and the runtime (singleton, plugins,
//! config) so instrumentation code can depend on a single crate.

pub mod core {
    pub use jdbcmetrics_core::*;
}

pub mod runtime {
    pub use jdbcmetrics_runtime::*;
}

pub use jdbcmetrics_runtime::JdbcMetrics;
