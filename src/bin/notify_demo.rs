//! Push one sample item of each kind through the configured notifier
//! (stdout when SLACK_WEBHOOK_URL is unset) to check webhook wiring.

use sky_feed_bot::notify::{format_message, notifier_from_env, Notifier};
use sky_feed_bot::{FeedItem, SourceKind};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();
    let notifier = notifier_from_env();

    let samples = [
        FeedItem {
            kind: SourceKind::Microblog,
            id: "demo-1".into(),
            author: "@chicagosky".into(),
            channel: None,
            text: "Feed bot test post".into(),
            url: "https://twitter.com/chicagosky".into(),
            score: None,
            published_at: 0,
        },
        FeedItem {
            kind: SourceKind::Forum,
            id: "demo-2".into(),
            author: "u/feedbot".into(),
            channel: Some("r/chicagosky".into()),
            text: "Feed bot test thread".into(),
            url: "https://reddit.com/r/chicagosky".into(),
            score: Some(1),
            published_at: 0,
        },
    ];

    for item in &samples {
        if let Err(e) = notifier.send(&format_message(item)).await {
            tracing::error!(error = %e, "demo delivery failed");
        }
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    }

    println!("notify-demo done via {}", notifier.name());
}
