// src/ingest/providers/forum_json.rs
//! Reddit public JSON listings: per-subreddit "new" plus keyword search.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde::Deserialize;
use url::Url;

use crate::error::FetchError;
use crate::ingest::http::HttpFetcher;
use crate::ingest::providers::pause;
use crate::ingest::types::{FeedItem, SourceKind, SourceProvider};
use crate::ingest::{dedup_batch, normalize_text, short_id};

pub const DEFAULT_FORUM_BASE_URL: &str = "https://www.reddit.com";
const PERMALINK_ORIGIN: &str = "https://reddit.com";
const LISTING_LIMIT: &str = "25";
const SEARCH_LIMIT: &str = "15";
const MAX_TITLE_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Post {
    id: Option<String>,
    title: Option<String>,
    author: Option<String>,
    permalink: Option<String>,
    subreddit: Option<String>,
    score: Option<i64>,
    created_utc: Option<f64>,
}

/// One independent upstream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumQuery {
    pub label: String,
    pub url: String,
}

pub struct ForumProvider {
    http: HttpFetcher,
    base_url: Url,
    subreddits: Vec<String>,
    keywords: Vec<String>,
    search_all: bool,
    request_delay: Duration,
}

impl ForumProvider {
    pub fn new(
        http: HttpFetcher,
        base_url: &str,
        subreddits: Vec<String>,
        keywords: Vec<String>,
        search_all: bool,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .with_context(|| format!("invalid forum base url {base_url:?}"))?;
        Ok(Self {
            http,
            base_url,
            subreddits,
            keywords,
            search_all,
            request_delay: Duration::ZERO,
        })
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Listing queries first, then keyword searches.
    pub fn queries(&self) -> Vec<ForumQuery> {
        let mut out = Vec::with_capacity(self.subreddits.len() + self.keywords.len());

        for sub in &self.subreddits {
            let mut url = self.endpoint(&format!("r/{sub}/new.json"));
            url.query_pairs_mut().append_pair("limit", LISTING_LIMIT);
            out.push(ForumQuery {
                label: format!("r/{sub}"),
                url: url.to_string(),
            });
        }

        let scoped = !self.search_all && !self.subreddits.is_empty();
        let scope = if scoped {
            self.subreddits.join("+")
        } else {
            "all".to_string()
        };
        for kw in &self.keywords {
            let mut url = self.endpoint(&format!("r/{scope}/search.json"));
            {
                let mut q = url.query_pairs_mut();
                q.append_pair("q", kw)
                    .append_pair("sort", "new")
                    .append_pair("t", "day")
                    .append_pair("limit", SEARCH_LIMIT);
                if scoped {
                    q.append_pair("restrict_sr", "on");
                }
            }
            out.push(ForumQuery {
                label: format!("search: {kw}"),
                url: url.to_string(),
            });
        }
        out
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base_path}/{path}"));
        url
    }

    pub async fn fetch_query(&self, query: &ForumQuery) -> Result<Vec<FeedItem>, FetchError> {
        let body = self.http.get_text(&query.url).await?;
        let listing: Listing = serde_json::from_str(&body)
            .map_err(|e| FetchError::malformed(&query.url, e))?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|c| to_item(c.data))
            .collect())
    }
}

fn to_item(post: Post) -> FeedItem {
    let title = normalize_text(post.title.as_deref().unwrap_or_default(), MAX_TITLE_CHARS);
    let id = post
        .id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| short_id(&title));
    FeedItem {
        kind: SourceKind::Forum,
        id,
        author: format!("u/{}", post.author.as_deref().unwrap_or("unknown")),
        channel: post.subreddit.map(|s| format!("r/{s}")),
        text: if title.is_empty() {
            "(no title)".to_string()
        } else {
            title
        },
        url: format!("{PERMALINK_ORIGIN}{}", post.permalink.unwrap_or_default()),
        score: post.score,
        published_at: post.created_utc.map(|t| t.max(0.0) as u64).unwrap_or(0),
    }
}

#[async_trait]
impl SourceProvider for ForumProvider {
    /// Each query stands alone; a failed query is logged and skipped.
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
        let mut out = Vec::new();
        for (i, q) in self.queries().iter().enumerate() {
            pause(self.request_delay, i == 0).await;
            match self.fetch_query(q).await {
                Ok(mut items) => {
                    tracing::info!(query = %q.label, items = items.len(), "forum query fetched");
                    out.append(&mut items);
                }
                Err(e) => {
                    tracing::warn!(query = %q.label, error = %e, "forum query failed");
                    counter!("feed_provider_errors_total", "provider" => "forum").increment(1);
                }
            }
        }
        Ok(dedup_batch(out))
    }

    fn name(&self) -> &'static str {
        "forum"
    }
}
