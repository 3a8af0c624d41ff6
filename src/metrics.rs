// src/metrics.rs
use std::net::SocketAddr;

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;

pub const ENV_METRICS_ADDR: &str = "METRICS_ADDR";

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_runs_total", "Pipeline passes started in loop mode.");
        describe_counter!(
            "feed_items_fetched_total",
            "Items returned by providers, labelled by provider."
        );
        describe_counter!("feed_items_new_total", "Items that passed deduplication.");
        describe_counter!(
            "feed_provider_errors_total",
            "Accounts or queries whose upstream fetch failed."
        );
        describe_counter!(
            "feed_mirror_failures_total",
            "Individual mirror attempts that failed before failover."
        );
        describe_counter!("feed_delivered_total", "Messages accepted by the notifier.");
        describe_counter!("feed_delivery_errors_total", "Messages the webhook rejected.");
        describe_gauge!(
            "feed_pipeline_last_run_ts",
            "Unix ts when the pipeline last finished dispatching."
        );
    });
}

/// Install the Prometheus exporter when `METRICS_ADDR` is set. Without it the
/// `metrics` macros stay no-ops. Must run inside the tokio runtime.
pub fn init_from_env() -> Result<Option<SocketAddr>> {
    let Ok(raw) = std::env::var(ENV_METRICS_ADDR) else {
        return Ok(None);
    };
    let addr: SocketAddr = raw
        .trim()
        .parse()
        .with_context(|| format!("{ENV_METRICS_ADDR}={raw:?} is not a socket address"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("prometheus: install exporter")?;
    ensure_metrics_described();
    Ok(Some(addr))
}
