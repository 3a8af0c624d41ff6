// src/notify/format.rs
use crate::ingest::types::{FeedItem, SourceKind};

/// Render an item as a short Slack-flavoured message. Pure and infallible.
pub fn format_message(item: &FeedItem) -> String {
    let header = match item.kind {
        SourceKind::Microblog => format!("🐦 *Twitter — {}*", item.author),
        SourceKind::Forum => {
            let mut label = format!(
                "🤖 *Reddit — {} — {}*",
                item.channel.as_deref().unwrap_or("r/?"),
                item.author
            );
            if let Some(score) = item.score.filter(|s| *s > 0) {
                label.push_str(&format!(" (⬆ {score})"));
            }
            label
        }
        SourceKind::News => format!("📰 *News — {}*", item.author),
    };
    format!("{header}\n{}\n{}", item.text, item.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forum(score: Option<i64>) -> FeedItem {
        FeedItem {
            kind: SourceKind::Forum,
            id: "1".into(),
            author: "u/skyfan".into(),
            channel: Some("r/wnba".into()),
            text: "Game thread".into(),
            url: "https://reddit.com/r/wnba/comments/1/".into(),
            score,
            published_at: 0,
        }
    }

    #[test]
    fn forum_with_score() {
        assert_eq!(
            format_message(&forum(Some(42))),
            "🤖 *Reddit — r/wnba — u/skyfan* (⬆ 42)\nGame thread\nhttps://reddit.com/r/wnba/comments/1/"
        );
    }

    #[test]
    fn missing_or_zero_score_is_omitted() {
        for score in [None, Some(0), Some(-3)] {
            let msg = format_message(&forum(score));
            assert!(!msg.contains('⬆'), "{msg}");
            assert!(msg.starts_with("🤖 *Reddit — r/wnba — u/skyfan*\n"));
        }
    }

    #[test]
    fn missing_channel_renders_placeholder() {
        let mut it = forum(None);
        it.channel = None;
        assert!(format_message(&it).contains("r/?"));
    }

    #[test]
    fn microblog_and_news_headers() {
        let mut it = forum(Some(5));
        it.kind = SourceKind::Microblog;
        it.author = "@chicagosky".into();
        assert!(format_message(&it).starts_with("🐦 *Twitter — @chicagosky*\n"));

        it.kind = SourceKind::News;
        it.author = "ESPN".into();
        assert!(format_message(&it).starts_with("📰 *News — ESPN*\n"));
    }
}
