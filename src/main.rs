//! Feed bot binary entrypoint.
//! Loads config, wires providers + notifier, then runs once or on an interval.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sky_feed_bot::config::FeedConfig;
use sky_feed_bot::notify::notifier_from_env;
use sky_feed_bot::{build_pipeline, metrics, RunMode, Scheduler};

/// `LOG_FORMAT=json` switches to JSON lines; filter via `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sky_feed_bot=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = FeedConfig::load_default()?;
    if let Some(addr) = metrics::init_from_env()? {
        tracing::info!(%addr, "prometheus exporter listening");
    }

    let mode = RunMode::from_env();
    tracing::info!(
        ?mode,
        accounts = cfg.accounts.len(),
        subreddits = cfg.subreddits.len(),
        keywords = cfg.keywords.len(),
        news_queries = cfg.news_queries.len(),
        interval_minutes = cfg.check_interval_minutes,
        "feed bot starting"
    );

    let mut pipeline = build_pipeline(&cfg, notifier_from_env()).await?;
    Scheduler::new(mode, cfg.check_interval())
        .run(&mut pipeline)
        .await
}
