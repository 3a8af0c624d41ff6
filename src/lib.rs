// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod notify;
pub mod seen;

use anyhow::Result;

use crate::config::FeedConfig;
use crate::ingest::http::HttpFetcher;
use crate::ingest::providers::{
    forum_json::ForumProvider, microblog_rss::MicroblogProvider, news_rss::NewsProvider,
};
use crate::ingest::scheduler::Pipeline;
use crate::ingest::types::SourceProvider;
use crate::notify::Notifier;
use crate::seen::SeenStore;

// ---- Re-exports for stable public API ----
pub use crate::error::{DeliveryError, FetchError};
pub use crate::ingest::filter_new;
pub use crate::ingest::scheduler::{CycleReport, RunMode, Scheduler};
pub use crate::ingest::types::{FeedItem, SourceKind};

/// Providers in pipeline order: microblog, forum, news. Sources with nothing
/// configured are left out.
pub fn build_providers(cfg: &FeedConfig) -> Result<Vec<Box<dyn SourceProvider>>> {
    let http = HttpFetcher::new(&cfg.user_agent, cfg.request_timeout())?;
    let mut out: Vec<Box<dyn SourceProvider>> = Vec::new();

    if !cfg.accounts.is_empty() {
        out.push(Box::new(
            MicroblogProvider::new(http.clone(), cfg.accounts.clone(), cfg.mirror_templates()?)
                .with_request_delay(cfg.request_delay()),
        ));
    }
    if !cfg.subreddits.is_empty() || !cfg.keywords.is_empty() {
        out.push(Box::new(
            ForumProvider::new(
                http.clone(),
                &cfg.forum_base_url,
                cfg.subreddits.clone(),
                cfg.keywords.clone(),
                cfg.search_all_for_keywords,
            )?
            .with_request_delay(cfg.request_delay()),
        ));
    }
    if !cfg.news_queries.is_empty() {
        out.push(Box::new(
            NewsProvider::new(http, &cfg.news_base_url, cfg.news_queries.clone())?
                .with_request_delay(cfg.request_delay()),
        ));
    }
    Ok(out)
}

/// Wire providers, the seen store (file-backed when configured) and `notifier`.
pub async fn build_pipeline(cfg: &FeedConfig, notifier: Box<dyn Notifier>) -> Result<Pipeline> {
    let providers = build_providers(cfg)?;
    let seen = match &cfg.seen_file {
        Some(path) => SeenStore::open(path, cfg.seen_retention_days).await,
        None => SeenStore::in_memory(),
    };
    Ok(Pipeline::new(providers, seen, notifier).with_post_delay(cfg.post_delay()))
}
