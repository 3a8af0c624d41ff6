// src/ingest/providers/news_rss.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use url::Url;

use crate::error::FetchError;
use crate::ingest::http::HttpFetcher;
use crate::ingest::providers::feed_xml::parse_feed;
use crate::ingest::providers::pause;
use crate::ingest::types::{FeedItem, SourceKind, SourceProvider};
use crate::ingest::{dedup_batch, normalize_text, short_id};

pub const DEFAULT_NEWS_BASE_URL: &str = "https://news.google.com";
const MAX_TITLE_CHARS: usize = 300;

/// News search results as RSS, one request per query.
pub struct NewsProvider {
    http: HttpFetcher,
    base_url: Url,
    queries: Vec<String>,
    request_delay: Duration,
}

impl NewsProvider {
    pub fn new(http: HttpFetcher, base_url: &str, queries: Vec<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid news base url {base_url:?}"))?;
        Ok(Self {
            http,
            base_url,
            queries,
            request_delay: Duration::ZERO,
        })
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn search_url(&self, query: &str) -> String {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base_path}/rss/search"));
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("hl", "en-US")
            .append_pair("gl", "US")
            .append_pair("ceid", "US:en");
        url.to_string()
    }

    pub async fn fetch_query(&self, query: &str) -> Result<Vec<FeedItem>, FetchError> {
        let url = self.search_url(query);
        let body = self.http.get_text(&url).await?;
        let entries = parse_feed(&body).map_err(|reason| FetchError::malformed(&url, reason))?;
        Ok(entries
            .into_iter()
            .map(|e| {
                let text = normalize_text(&e.title, MAX_TITLE_CHARS);
                FeedItem {
                    kind: SourceKind::News,
                    id: short_id(if e.link.is_empty() { &text } else { &e.link }),
                    author: e.source.unwrap_or_else(|| "Google News".to_string()),
                    channel: None,
                    text,
                    url: e.link,
                    score: None,
                    published_at: e.published_at,
                }
            })
            .filter(|it| !it.text.is_empty())
            .collect())
    }
}

#[async_trait]
impl SourceProvider for NewsProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
        let mut out = Vec::new();
        for (i, q) in self.queries.iter().enumerate() {
            pause(self.request_delay, i == 0).await;
            match self.fetch_query(q).await {
                Ok(mut items) => {
                    tracing::info!(query = %q, items = items.len(), "news query fetched");
                    out.append(&mut items);
                }
                Err(e) => {
                    tracing::warn!(query = %q, error = %e, "news query failed");
                    counter!("feed_provider_errors_total", "provider" => "news").increment(1);
                }
            }
        }
        Ok(dedup_batch(out))
    }

    fn name(&self) -> &'static str {
        "news"
    }
}
