// src/notify/mod.rs
pub mod console;
pub mod format;
pub mod slack;

use crate::error::DeliveryError;

pub use console::ConsoleNotifier;
pub use format::format_message;
pub use slack::SlackNotifier;

pub const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), DeliveryError>;
    fn name(&self) -> &'static str;
}

/// Webhook when a URL is configured, console otherwise.
pub fn notifier_for(webhook_url: Option<&str>) -> Box<dyn Notifier> {
    match webhook_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => Box::new(SlackNotifier::new(url.to_string())),
        None => {
            tracing::warn!("no {ENV_SLACK_WEBHOOK_URL} set, printing messages to console instead");
            Box::new(ConsoleNotifier::stdout())
        }
    }
}

pub fn notifier_from_env() -> Box<dyn Notifier> {
    notifier_for(std::env::var(ENV_SLACK_WEBHOOK_URL).ok().as_deref())
}
