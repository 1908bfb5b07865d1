//! jdbcmetrics demo
//!
//! Builds the singleton from the environment, pushes some synthetic
//! read/write traffic through the metrics, and prints the text exposition.
//!
//! ```text
//! JDBCMETRICS_METRICS_CONFIGURATORS=jdbcmetrics_runtime::plugins::LogConfigurator \
//! JDBCMETRICS_LOG_INTERVAL_MS=1000 RUST_LOG=info jdbcmetrics-demo
//! ```

use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use jdbcmetrics_runtime::JdbcMetrics;

const REQUESTS: u64 = 50;

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let metrics = match JdbcMetrics::instance() {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind(), "jdbcmetrics startup failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(configurators = ?metrics.configurators(), "jdbcmetrics ready");

    for req in 0..REQUESTS {
        let reads = req % 4 + 1;
        let writes = req % 2;
        for _ in 0..reads {
            metrics.read_timer().time(|| std::thread::sleep(Duration::from_micros(200)));
            metrics.total_number_of_reads().inc();
            metrics.read_meter().mark();
        }
        for _ in 0..writes {
            metrics.write_timer().time(|| std::thread::sleep(Duration::from_micros(500)));
            metrics.total_number_of_writes().inc();
            metrics.write_meter().mark();
        }
        metrics.read_counts_per_request().update(reads as i64);
        metrics.write_counts_per_request().update(writes as i64);
    }

    println!("{}", metrics.registry().render_text());
    ExitCode::SUCCESS
}
