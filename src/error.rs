// src/error.rs
use thiserror::Error;

/// Failure to obtain items from an upstream endpoint.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("all {attempts} endpoints failed for {target}; last error: {last}")]
    AllEndpointsFailed {
        target: String,
        attempts: usize,
        last: Box<FetchError>,
    },

    #[error("no endpoints configured for {target}")]
    NoEndpoints { target: String },
}

impl FetchError {
    pub fn malformed(url: &str, reason: impl ToString) -> Self {
        Self::Malformed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Failure to hand a message to the webhook. Never retried.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
