// src/ingest/types.rs
use std::fmt;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Microblog,
    Forum,
    News,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Microblog => "microblog",
            SourceKind::Forum => "forum",
            SourceKind::News => "news",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upstream post, rebuilt fresh on every poll.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct FeedItem {
    pub kind: SourceKind,
    pub id: String,           // stable per upstream item within `kind`
    pub author: String,       // "@handle", "u/user", outlet name
    pub channel: Option<String>, // e.g. "r/wnba"
    pub text: String,
    pub url: String,
    pub score: Option<i64>,
    pub published_at: u64, // unix seconds, 0 when unknown
}

impl FeedItem {
    /// Key used by the seen-store; namespaced so ids never collide across kinds.
    pub fn seen_key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_key_is_namespaced_by_kind() {
        let mut it = FeedItem {
            kind: SourceKind::Forum,
            id: "abc".into(),
            author: "u/x".into(),
            channel: None,
            text: "t".into(),
            url: "https://reddit.com/x".into(),
            score: None,
            published_at: 0,
        };
        assert_eq!(it.seen_key(), "forum:abc");
        it.kind = SourceKind::Microblog;
        assert_eq!(it.seen_key(), "microblog:abc");
    }
}
