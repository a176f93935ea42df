//! Prometheus sink
//!
//! Every event field becomes a gauge named after its key. The exporter serving
//! those gauges is built by [`builder`] and installed by the binary.
//!
//! Prometheus metric names only allow `[a-zA-Z0-9_:]`, so the exporter rewrites
//! every other character of a key to `_`:
//! `dm_os_performance_counters.cpu_usage_%.default` is scraped as
//! `dm_os_performance_counters_cpu_usage__default`.
//!
//! A field missing from later events, such as an average skipped for want of a
//! base, is not updated again. The exporter forgets gauges left untouched for
//! [`IDLE_PERIODS`] poll periods rather than serve their last value forever.

use std::{net::SocketAddr, time::Duration};

use metrics::gauge;
use metrics_exporter_prometheus::PrometheusBuilder;
use metrics_util::MetricKindMask;
use mssql_perf::Event;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::trace;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "snake_case")]
/// Configuration for [`Prometheus`]
pub struct Config {
    /// Address the exporter listens on
    pub addr: SocketAddr,
    /// Labels added to every exported metric
    #[serde(default)]
    pub global_labels: FxHashMap<String, String>,
}

/// Number of poll periods a gauge may go without an update before the exporter
/// drops it.
pub const IDLE_PERIODS: u32 = 3;

/// Exporter for `config`, listening on `config.addr`, for a beat polling every
/// `period`.
#[must_use]
pub fn builder(config: &Config, period: Duration) -> PrometheusBuilder {
    let mut builder = PrometheusBuilder::new()
        .with_http_listener(config.addr)
        .idle_timeout(MetricKindMask::GAUGE, Some(period * IDLE_PERIODS));
    for (k, v) in &config.global_labels {
        builder = builder.add_global_label(k.clone(), v.clone());
    }
    builder
}

/// The `Prometheus` sink implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Prometheus {}

impl Prometheus {
    /// Create a new [`Prometheus`] instance
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// Set one gauge per field of `event`.
    pub fn publish(&self, event: &Event) {
        for (key, value) in &event.fields {
            trace!("gauge: {key} = {value}");
            gauge!(key.clone()).set(*value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use mssql_perf::{Metric, event::assemble};
    use std::time::SystemTime;

    #[test]
    fn fields_become_gauges() {
        let event = assemble(
            vec![
                Metric::new("dm_os_performance_counters.user_connections".to_string(), 42.0),
                Metric::new("dm_os_performance_counters.page_life_expectancy".to_string(), 300.0),
            ],
            SystemTime::now(),
        );

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, || Prometheus::new().publish(&event));

        let mut gauges: Vec<(String, f64)> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Gauge(v) => Some((key.key().name().to_string(), v.into_inner())),
                _ => None,
            })
            .collect();
        gauges.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(
            gauges,
            vec![
                ("dm_os_performance_counters.page_life_expectancy".to_string(), 300.0),
                ("dm_os_performance_counters.user_connections".to_string(), 42.0),
            ]
        );
    }

    #[test]
    fn exporter_renders_rewritten_keys() {
        let config = Config {
            addr: "127.0.0.1:0".parse().expect("valid address"),
            global_labels: [("host".to_string(), "db01".to_string())]
                .into_iter()
                .collect(),
        };
        let recorder = builder(&config, Duration::from_secs(1)).build_recorder();
        let handle = recorder.handle();

        let event = assemble(
            vec![Metric::new(
                "dm_os_performance_counters.user_connections".to_string(),
                42.0,
            )],
            SystemTime::now(),
        );
        metrics::with_local_recorder(&recorder, || Prometheus::new().publish(&event));

        let rendered = handle.render();
        assert!(rendered.contains("dm_os_performance_counters_user_connections{host=\"db01\"} 42"));
        assert!(!rendered.contains("dm_os_performance_counters."));
    }

    #[test]
    fn config_deserializes() {
        let config: Config = serde_yaml::from_str(
            r#"
addr: "127.0.0.1:9000"
global_labels:
  host: db01
"#,
        )
        .expect("config should deserialize");
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.global_labels.get("host").map(String::as_str), Some("db01"));
    }
}
