// src/ingest/http.rs
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::error::FetchError;

pub const DEFAULT_USER_AGENT: &str =
    "WNBA-Sky-FeedBot/2.0 (Slack feed aggregator; contact: github.com)";

const FEED_ACCEPT: &str =
    "application/rss+xml, application/xml, application/atom+xml, text/xml, application/json, */*";

/// Thin wrapper around one shared `reqwest::Client` for upstream GETs.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("building upstream http client")?;
        Ok(Self { client })
    }

    /// GET `url` and return the body; non-2xx is an error.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}
