//! Point-in-time views of a registry, for reporters.
//!
//! [`MetricsRegistry::snapshot`] gives a serde-serializable structure;
//! [`MetricsRegistry::render_text`] gives Prometheus-style text lines.

use std::fmt::Write;
use std::time::Duration;

use serde::Serialize;

use crate::metric::{Counter, Histogram, Meter, Metric, MetricName, Snapshot, Timer};
use crate::registry::MetricsRegistry;

#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub metrics: Vec<MetricSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    pub name: MetricName,
    #[serde(flatten)]
    pub value: MetricValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rates {
    pub mean: f64,
    pub m1: f64,
    pub m5: f64,
    pub m15: f64,
    pub unit: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub p98: f64,
    pub p99: f64,
    pub p999: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricValue {
    Counter {
        count: i64,
    },
    Meter {
        count: u64,
        event_type: String,
        rates: Rates,
    },
    Histogram {
        biased: bool,
        distribution: Distribution,
    },
    Timer {
        duration_unit: &'static str,
        distribution: Distribution,
        rates: Rates,
    },
}

/// Human name of a time unit (`"seconds"`, `"milliseconds"`, ...).
pub fn unit_label(unit: Duration) -> &'static str {
    match unit.as_nanos() {
        1 => "nanoseconds",
        1_000 => "microseconds",
        1_000_000 => "milliseconds",
        1_000_000_000 => "seconds",
        60_000_000_000 => "minutes",
        3_600_000_000_000 => "hours",
        86_400_000_000_000 => "days",
        _ => "custom",
    }
}

fn counter_value(c: &Counter) -> MetricValue {
    MetricValue::Counter { count: c.count() }
}

fn meter_rates(m: &Meter) -> Rates {
    Rates {
        mean: m.mean_rate(),
        m1: m.one_minute_rate(),
        m5: m.five_minute_rate(),
        m15: m.fifteen_minute_rate(),
        unit: unit_label(m.rate_unit()),
    }
}

fn distribution(
    count: u64,
    min: f64,
    max: f64,
    mean: f64,
    std_dev: f64,
    s: &Snapshot,
    scale: impl Fn(f64) -> f64,
) -> Distribution {
    Distribution {
        count,
        min,
        max,
        mean,
        std_dev,
        median: scale(s.median()),
        p75: scale(s.p75()),
        p95: scale(s.p95()),
        p98: scale(s.p98()),
        p99: scale(s.p99()),
        p999: scale(s.p999()),
    }
}

fn histogram_value(h: &Histogram) -> MetricValue {
    let s = h.snapshot();
    MetricValue::Histogram {
        biased: h.is_biased(),
        distribution: distribution(
            h.count(),
            h.min() as f64,
            h.max() as f64,
            h.mean(),
            h.std_dev(),
            &s,
            |v| v,
        ),
    }
}

fn timer_value(t: &Timer) -> MetricValue {
    let s = t.snapshot();
    MetricValue::Timer {
        duration_unit: unit_label(t.duration_unit()),
        distribution: distribution(t.count(), t.min(), t.max(), t.mean(), t.std_dev(), &s, |v| {
            t.scale(v)
        }),
        rates: Rates {
            mean: t.mean_rate(),
            m1: t.one_minute_rate(),
            m5: t.five_minute_rate(),
            m15: t.fifteen_minute_rate(),
            unit: unit_label(t.rate_unit()),
        },
    }
}

impl MetricSnapshot {
    pub fn capture(name: &MetricName, metric: &Metric) -> Self {
        let value = match metric {
            Metric::Counter(c) => counter_value(c),
            Metric::Meter(m) => MetricValue::Meter {
                count: m.count(),
                event_type: m.event_type().to_string(),
                rates: meter_rates(m),
            },
            Metric::Histogram(h) => histogram_value(h),
            Metric::Timer(t) => timer_value(t),
        };
        Self {
            name: name.clone(),
            value,
        }
    }
}

fn render_rates(name: &str, r: &Rates, out: &mut String) {
    let _ = writeln!(out, "# TYPE {}_rate gauge", name);
    for (window, v) in [("mean", r.mean), ("1m", r.m1), ("5m", r.m5), ("15m", r.m15)] {
        let _ = writeln!(out, "{}_rate{{window=\"{}\",unit=\"{}\"}} {}", name, window, r.unit, v);
    }
}

fn render_summary(name: &str, d: &Distribution, sum: f64, out: &mut String) {
    let _ = writeln!(out, "# TYPE {} summary", name);
    for (q, v) in [
        ("0.5", d.median),
        ("0.75", d.p75),
        ("0.95", d.p95),
        ("0.98", d.p98),
        ("0.99", d.p99),
        ("0.999", d.p999),
    ] {
        let _ = writeln!(out, "{}{{quantile=\"{}\"}} {}", name, q, v);
    }
    let _ = writeln!(out, "{}_sum {}", name, sum);
    let _ = writeln!(out, "{}_count {}", name, d.count);
    let _ = writeln!(out, "{}_min {}", name, d.min);
    let _ = writeln!(out, "{}_max {}", name, d.max);
}

impl MetricsRegistry {
    /// Capture every metric, sorted by name.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            metrics: self
                .metrics()
                .iter()
                .map(|(name, metric)| MetricSnapshot::capture(name, metric))
                .collect(),
        }
    }

    /// Render all metrics in Prometheus text exposition style.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for (name, metric) in self.metrics() {
            let flat = name.flat();
            match &metric {
                Metric::Counter(c) => {
                    let _ = writeln!(out, "# TYPE {} counter", flat);
                    let _ = writeln!(out, "{} {}", flat, c.count());
                }
                Metric::Meter(m) => {
                    let _ = writeln!(out, "# TYPE {}_total counter", flat);
                    let _ = writeln!(out, "{}_total{{event_type=\"{}\"}} {}", flat, m.event_type(), m.count());
                    render_rates(&flat, &meter_rates(m), &mut out);
                }
                Metric::Histogram(h) => {
                    if let MetricValue::Histogram { distribution, .. } = histogram_value(h) {
                        render_summary(&flat, &distribution, h.sum() as f64, &mut out);
                    }
                }
                Metric::Timer(t) => {
                    if let MetricValue::Timer { duration_unit, distribution, rates } = timer_value(t) {
                        let unit_name = format!("{}_{}", flat, duration_unit);
                        render_summary(&unit_name, &distribution, t.sum(), &mut out);
                        render_rates(&flat, &rates, &mut out);
                    }
                }
            }
        }
        out
    }
}
