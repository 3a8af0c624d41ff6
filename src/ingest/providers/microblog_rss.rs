// src/ingest/providers/microblog_rss.rs
//! Microblog accounts read through RSS bridge mirrors (Nitter forks, RSSHub).

use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use url::Url;

use crate::error::FetchError;
use crate::ingest::failover::first_success;
use crate::ingest::http::HttpFetcher;
use crate::ingest::providers::feed_xml::{parse_feed, FeedEntry};
use crate::ingest::providers::pause;
use crate::ingest::types::{FeedItem, SourceKind, SourceProvider};
use crate::ingest::{normalize_text, short_id};

const CANONICAL_ORIGIN: &str = "https://twitter.com";
const MAX_POST_CHARS: usize = 280;
const ACCOUNT_PLACEHOLDER: &str = "{account}";

/// Mirror endpoint template, e.g. `https://xcancel.com/{account}/rss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorTemplate {
    template: String,
    origin: String,
}

impl MirrorTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let template = template.trim();
        if !template.contains(ACCOUNT_PLACEHOLDER) {
            bail!("mirror template {template:?} lacks {ACCOUNT_PLACEHOLDER}");
        }
        let sample = Url::parse(&template.replace(ACCOUNT_PLACEHOLDER, "probe"))
            .with_context(|| format!("mirror template {template:?} is not a valid URL"))?;
        Ok(Self {
            template: template.to_string(),
            origin: sample.origin().ascii_serialization(),
        })
    }

    pub fn render(&self, account: &str) -> String {
        self.template.replace(ACCOUNT_PLACEHOLDER, account)
    }

    /// `scheme://host[:port]` of the mirror.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl fmt::Display for MirrorTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

pub struct MicroblogProvider {
    http: HttpFetcher,
    accounts: Vec<String>,
    mirrors: Vec<MirrorTemplate>,
    request_delay: Duration,
}

impl MicroblogProvider {
    pub fn new(http: HttpFetcher, accounts: Vec<String>, mirrors: Vec<MirrorTemplate>) -> Self {
        Self {
            http,
            accounts,
            mirrors,
            request_delay: Duration::ZERO,
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Fetch one account, walking the mirrors in order until one answers with
    /// a parseable feed. Mirrors after the winning one are not contacted.
    pub async fn fetch_account(&self, account: &str) -> Result<Vec<FeedItem>, FetchError> {
        let http = &self.http;
        let (idx, entries) = first_success(account, &self.mirrors, |mirror| {
            let url = mirror.render(account);
            async move {
                let body = http.get_text(&url).await?;
                parse_feed(&body).map_err(|reason| FetchError::malformed(&url, reason))
            }
        })
        .await?;

        tracing::info!(
            %account,
            mirror = %self.mirrors[idx],
            items = entries.len(),
            "microblog feed fetched"
        );

        Ok(entries
            .into_iter()
            .map(|e| self.to_item(account, e))
            .collect())
    }

    fn to_item(&self, account: &str, entry: FeedEntry) -> FeedItem {
        let url = self.canonical_link(&entry.link);
        let text = normalize_text(&entry.title, MAX_POST_CHARS);
        let id = if url.is_empty() {
            short_id(&entry.title)
        } else {
            short_id(&url)
        };
        FeedItem {
            kind: SourceKind::Microblog,
            id,
            author: format!("@{account}"),
            channel: None,
            text: if text.is_empty() {
                "(no text)".to_string()
            } else {
                text
            },
            url,
            score: None,
            published_at: entry.published_at,
        }
    }

    /// Point mirror links back at the platform and drop the `#m` style fragment.
    fn canonical_link(&self, link: &str) -> String {
        let mut out = link.trim().to_string();
        for m in &self.mirrors {
            if let Some(rest) = out.strip_prefix(m.origin()) {
                if rest.is_empty() || rest.starts_with('/') {
                    out = format!("{CANONICAL_ORIGIN}{rest}");
                    break;
                }
            }
        }
        match Url::parse(&out) {
            Ok(mut u) => {
                u.set_fragment(None);
                u.to_string()
            }
            Err(_) => out,
        }
    }
}

#[async_trait]
impl SourceProvider for MicroblogProvider {
    /// Never fails: an account whose mirrors are all down contributes nothing.
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
        let mut out = Vec::new();
        for (i, account) in self.accounts.iter().enumerate() {
            pause(self.request_delay, i == 0).await;
            match self.fetch_account(account).await {
                Ok(mut items) => out.append(&mut items),
                Err(e) => {
                    tracing::warn!(%account, error = %e, "all microblog mirrors failed");
                    counter!("feed_provider_errors_total", "provider" => "microblog").increment(1);
                }
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "microblog"
    }
}
