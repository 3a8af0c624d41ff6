// src/config/feeds.rs
//! What to watch and how to poll it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ingest::http::DEFAULT_USER_AGENT;
use crate::ingest::providers::forum_json::DEFAULT_FORUM_BASE_URL;
use crate::ingest::providers::microblog_rss::MirrorTemplate;
use crate::ingest::providers::news_rss::DEFAULT_NEWS_BASE_URL;
use crate::seen::DEFAULT_RETENTION_DAYS;

pub const ENV_CONFIG_PATH: &str = "FEEDBOT_CONFIG_PATH";
pub const ENV_SEEN_FILE: &str = "SEEN_FILE";
pub const ENV_CHECK_INTERVAL_MINUTES: &str = "CHECK_INTERVAL_MINUTES";

const DEFAULT_TOML_PATH: &str = "config/feeds.toml";
const DEFAULT_JSON_PATH: &str = "config/feeds.json";

fn default_accounts() -> Vec<String> {
    to_strings(&["chicagosky", "WNBA", "WNBAChiSky"])
}
fn default_subreddits() -> Vec<String> {
    to_strings(&["wnba", "chicagosky"])
}
fn default_keywords() -> Vec<String> {
    to_strings(&["chicago sky", "angel reese", "chennedy carter"])
}
fn default_news_queries() -> Vec<String> {
    to_strings(&["Chicago Sky WNBA"])
}
fn default_mirrors() -> Vec<String> {
    to_strings(&[
        "https://xcancel.com/{account}/rss",
        "https://nitter.privacydev.net/{account}/rss",
        "https://nitter.poast.org/{account}/rss",
        "https://rsshub.app/twitter/user/{account}",
    ])
}
fn default_check_interval_minutes() -> u64 {
    10
}
fn default_forum_base_url() -> String {
    DEFAULT_FORUM_BASE_URL.to_string()
}
fn default_news_base_url() -> String {
    DEFAULT_NEWS_BASE_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_request_timeout_secs() -> u64 {
    20
}
fn default_request_delay_ms() -> u64 {
    1_000
}
fn default_post_delay_ms() -> u64 {
    500
}
fn default_seen_file() -> Option<String> {
    Some("seen_posts.json".to_string())
}
fn default_seen_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    #[serde(default = "default_accounts")]
    pub accounts: Vec<String>,
    #[serde(default = "default_subreddits")]
    pub subreddits: Vec<String>,
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Search r/all for keywords instead of only the configured subreddits.
    #[serde(default)]
    pub search_all_for_keywords: bool,
    /// Empty list disables the news source.
    #[serde(default = "default_news_queries")]
    pub news_queries: Vec<String>,
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: u64,
    /// Ordered by preference; each must contain `{account}`.
    #[serde(default = "default_mirrors")]
    pub microblog_mirrors: Vec<String>,
    #[serde(default = "default_forum_base_url")]
    pub forum_base_url: String,
    #[serde(default = "default_news_base_url")]
    pub news_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_post_delay_ms")]
    pub post_delay_ms: u64,
    /// `None` or empty keeps the seen-set in memory only.
    #[serde(default = "default_seen_file")]
    pub seen_file: Option<String>,
    #[serde(default = "default_seen_retention_days")]
    pub seen_retention_days: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            accounts: default_accounts(),
            subreddits: default_subreddits(),
            keywords: default_keywords(),
            search_all_for_keywords: false,
            news_queries: default_news_queries(),
            check_interval_minutes: default_check_interval_minutes(),
            microblog_mirrors: default_mirrors(),
            forum_base_url: default_forum_base_url(),
            news_base_url: default_news_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            post_delay_ms: default_post_delay_ms(),
            seen_file: default_seen_file(),
            seen_retention_days: default_seen_retention_days(),
        }
    }
}

impl FeedConfig {
    /// Load from an explicit path. `.json` is read as JSON, anything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feed config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: FeedConfig = if ext == "json" {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?
        } else {
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        };
        cfg.sanitized()
    }

    /// Resolution order:
    /// 1) $FEEDBOT_CONFIG_PATH (must exist)
    /// 2) config/feeds.toml
    /// 3) config/feeds.json
    /// 4) built-in defaults
    ///
    /// Env overrides are applied on top of whichever source won.
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_TOML_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_TOML_PATH))?
        } else if Path::new(DEFAULT_JSON_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_JSON_PATH))?
        } else {
            Self::default().sanitized()?
        };
        base.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(v) = std::env::var(ENV_SEEN_FILE) {
            self.seen_file = Some(v);
        }
        if let Ok(v) = std::env::var(ENV_CHECK_INTERVAL_MINUTES) {
            self.check_interval_minutes = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CHECK_INTERVAL_MINUTES}={v:?} is not a number"))?;
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Result<Self> {
        self.accounts = clean_list(self.accounts)
            .into_iter()
            .map(|a| a.trim_start_matches('@').to_string())
            .collect();
        self.subreddits = clean_list(self.subreddits)
            .into_iter()
            .map(|s| s.trim_start_matches("r/").to_string())
            .collect();
        self.keywords = clean_list(self.keywords);
        self.news_queries = clean_list(self.news_queries);
        self.microblog_mirrors = clean_list(self.microblog_mirrors);
        self.check_interval_minutes = self.check_interval_minutes.max(1);
        self.seen_retention_days = self.seen_retention_days.max(1);
        self.seen_file = self
            .seen_file
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        // Fail fast on bad templates rather than on the first poll.
        self.mirror_templates()?;
        Ok(self)
    }

    pub fn mirror_templates(&self) -> Result<Vec<MirrorTemplate>> {
        self.microblog_mirrors
            .iter()
            .map(|m| MirrorTemplate::parse(m))
            .collect()
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.post_delay_ms)
    }
}

/// Trim, drop empties, drop repeats; first occurrence keeps its place.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
