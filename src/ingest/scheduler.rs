// src/ingest/scheduler.rs
use std::time::Duration;

use anyhow::{Context, Result};
use metrics::{counter, gauge};

use crate::ingest::types::SourceProvider;
use crate::ingest::{fetch_all, filter_new};
use crate::notify::{format_message, Notifier};
use crate::seen::SeenStore;

pub const ENV_RUN_MODE: &str = "RUN_MODE";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// One pass, then return.
    Once,
    /// Pass, sleep, repeat until the process is stopped.
    Loop,
}

impl RunMode {
    /// `once` (any case) selects [`RunMode::Once`]; anything else loops.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "once" => RunMode::Once,
            _ => RunMode::Loop,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::var(ENV_RUN_MODE).ok().as_deref())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub new: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// fetch -> dedup -> format -> dispatch -> persist, strictly in sequence.
pub struct Pipeline {
    providers: Vec<Box<dyn SourceProvider>>,
    seen: SeenStore,
    notifier: Box<dyn Notifier>,
    post_delay: Duration,
}

impl Pipeline {
    pub fn new(
        providers: Vec<Box<dyn SourceProvider>>,
        seen: SeenStore,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            providers,
            seen,
            notifier,
            post_delay: Duration::ZERO,
        }
    }

    pub fn with_post_delay(mut self, delay: Duration) -> Self {
        self.post_delay = delay;
        self
    }

    pub fn seen(&self) -> &SeenStore {
        &self.seen
    }

    /// One full pass. Items are marked seen before dispatch, so an item whose
    /// delivery fails is not offered again.
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        tracing::info!(notifier = self.notifier.name(), "starting feed check");

        let raw = fetch_all(&self.providers).await;
        let fetched = raw.len();
        let fresh = filter_new(&mut self.seen, raw);

        let mut report = CycleReport {
            fetched,
            new: fresh.len(),
            ..Default::default()
        };
        tracing::info!(fetched, new = report.new, "new items to share");

        for (i, item) in fresh.iter().enumerate() {
            if i > 0 && !self.post_delay.is_zero() {
                tokio::time::sleep(self.post_delay).await;
            }
            let msg = format_message(item);
            match self.notifier.send(&msg).await {
                Ok(()) => {
                    report.delivered += 1;
                    counter!("feed_delivered_total").increment(1);
                }
                Err(e) => {
                    report.failed += 1;
                    counter!("feed_delivery_errors_total").increment(1);
                    tracing::error!(
                        error = %e,
                        kind = %item.kind,
                        id = %item.id,
                        notifier = self.notifier.name(),
                        "delivery failed, item dropped"
                    );
                }
            }
        }

        gauge!("feed_pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        self.seen.persist().await.context("persisting seen store")?;

        tracing::info!(
            delivered = report.delivered,
            failed = report.failed,
            seen = self.seen.len(),
            "feed check done"
        );
        Ok(report)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Scheduler {
    mode: RunMode,
    interval: Duration,
}

impl Scheduler {
    pub fn new(mode: RunMode, interval: Duration) -> Self {
        Self { mode, interval }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// In `Once` mode the pass result is returned. In `Loop` mode a failed pass
    /// is logged and the loop carries on; this only returns if the task is
    /// dropped from outside.
    pub async fn run(&self, pipeline: &mut Pipeline) -> Result<()> {
        match self.mode {
            RunMode::Once => pipeline.run_once().await.map(|_| ()),
            RunMode::Loop => {
                tracing::info!(
                    interval_secs = self.interval.as_secs(),
                    "feed bot running in loop mode"
                );
                loop {
                    counter!("feed_runs_total").increment(1);
                    if let Err(e) = pipeline.run_once().await {
                        tracing::error!("feed check failed: {e:#}");
                    }
                    tracing::info!(sleep_secs = self.interval.as_secs(), "sleeping until next check");
                    tokio::time::sleep(self.interval).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_parsing() {
        assert_eq!(RunMode::parse(Some("once")), RunMode::Once);
        assert_eq!(RunMode::parse(Some(" ONCE ")), RunMode::Once);
        assert_eq!(RunMode::parse(Some("loop")), RunMode::Loop);
        assert_eq!(RunMode::parse(Some("")), RunMode::Loop);
        assert_eq!(RunMode::parse(None), RunMode::Loop);
    }
}
