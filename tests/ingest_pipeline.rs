// tests/ingest_pipeline.rs
use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sky_feed_bot::config::FeedConfig;
use sky_feed_bot::ingest::scheduler::Pipeline;
use sky_feed_bot::ingest::types::SourceProvider;
use sky_feed_bot::notify::{ConsoleNotifier, SlackNotifier};
use sky_feed_bot::seen::SeenStore;
use sky_feed_bot::{build_pipeline, build_providers, FeedItem, FetchError, SourceKind};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct FixedProvider(Vec<FeedItem>);

#[async_trait]
impl SourceProvider for FixedProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct BrokenProvider;

#[async_trait]
impl SourceProvider for BrokenProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
        Err(FetchError::Status {
            url: "https://down.test".into(),
            status: 502,
        })
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

fn item(id: &str) -> FeedItem {
    FeedItem {
        kind: SourceKind::Forum,
        id: id.into(),
        author: "u/skyfan".into(),
        channel: Some("r/wnba".into()),
        text: format!("post {id}"),
        url: format!("https://reddit.com/r/wnba/comments/{id}/"),
        score: None,
        published_at: 0,
    }
}

#[tokio::test]
async fn second_pass_with_same_items_sends_nothing() {
    let buf = SharedBuf::default();
    let providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(FixedProvider(vec![item("1"), item("2")]))];
    let mut p = Pipeline::new(
        providers,
        SeenStore::in_memory(),
        Box::new(ConsoleNotifier::to_writer(Box::new(buf.clone()))),
    );

    let first = p.run_once().await.unwrap();
    assert_eq!((first.fetched, first.new, first.delivered, first.failed), (2, 2, 2, 0));
    assert!(p.seen().contains("forum:1") && p.seen().contains("forum:2"));
    let out = buf.text();
    assert!(out.find("post 1").unwrap() < out.find("post 2").unwrap());

    let second = p.run_once().await.unwrap();
    assert_eq!((second.fetched, second.new, second.delivered), (2, 0, 0));
    assert_eq!(buf.text(), out);
}

#[tokio::test]
async fn provider_error_does_not_block_other_sources() {
    let buf = SharedBuf::default();
    let providers: Vec<Box<dyn SourceProvider>> = vec![
        Box::new(BrokenProvider),
        Box::new(FixedProvider(vec![item("7")])),
    ];
    let mut p = Pipeline::new(
        providers,
        SeenStore::in_memory(),
        Box::new(ConsoleNotifier::to_writer(Box::new(buf.clone()))),
    );
    let r = p.run_once().await.unwrap();
    assert_eq!(r.delivered, 1);
    assert!(buf.text().contains("post 7"));
}

#[tokio::test]
async fn failed_delivery_is_not_retried_next_pass() {
    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&hook)
        .await;

    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(FixedProvider(vec![item("9")]))];
    let mut p = Pipeline::new(
        providers,
        SeenStore::in_memory(),
        Box::new(SlackNotifier::new(hook.uri())),
    );
    let first = p.run_once().await.unwrap();
    assert_eq!((first.new, first.delivered, first.failed), (1, 0, 1));

    let second = p.run_once().await.unwrap();
    assert_eq!((second.new, second.failed), (0, 0));
}

#[tokio::test]
async fn seen_file_carries_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let seen_path = dir.path().join("seen_posts.json");

    let buf = SharedBuf::default();
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(FixedProvider(vec![item("1")]))];
    let mut p = Pipeline::new(
        providers,
        SeenStore::open(&seen_path, 7).await,
        Box::new(ConsoleNotifier::to_writer(Box::new(buf.clone()))),
    );
    assert_eq!(p.run_once().await.unwrap().delivered, 1);
    drop(p);

    let providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(FixedProvider(vec![item("1"), item("2")]))];
    let mut restarted = Pipeline::new(
        providers,
        SeenStore::open(&seen_path, 7).await,
        Box::new(ConsoleNotifier::to_writer(Box::new(buf.clone()))),
    );
    let r = restarted.run_once().await.unwrap();
    assert_eq!((r.new, r.delivered), (1, 1));
}

#[tokio::test]
async fn dead_mirrors_leave_forum_delivery_intact() {
    let upstream = MockServer::start().await;
    // every microblog mirror is down
    Mock::given(method("GET"))
        .and(path_regex(r"^/mirror[12]/.+/rss$"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/wnba/new.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(include_str!("fixtures/reddit_new.json")),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let hook = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&hook)
        .await;

    let cfg = FeedConfig {
        accounts: vec!["chicagosky".into(), "WNBA".into()],
        subreddits: vec!["wnba".into()],
        keywords: vec![],
        news_queries: vec![],
        microblog_mirrors: vec![
            format!("{}/mirror1/{{account}}/rss", upstream.uri()),
            format!("{}/mirror2/{{account}}/rss", upstream.uri()),
        ],
        forum_base_url: upstream.uri(),
        request_delay_ms: 0,
        post_delay_ms: 0,
        seen_file: None,
        ..FeedConfig::default()
    };
    assert_eq!(build_providers(&cfg).unwrap().len(), 2);

    let mut p = build_pipeline(&cfg, Box::new(SlackNotifier::new(format!("{}/hook", hook.uri()))))
        .await
        .unwrap();
    let r = p.run_once().await.unwrap();
    assert_eq!((r.fetched, r.new, r.delivered, r.failed), (2, 2, 2, 0));
}
