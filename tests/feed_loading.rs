//! Integration tests for the reader session over real HTTP.
//!
//! Each test starts its own mock server and builds an `App` whose registry
//! points at it, then checks the observable state: registry contents, menu
//! visibility, the rendered title and the entry list.

use feedreader::app::App;
use feedreader::config::{Config, FetchConfig};
use feedreader::feed::{FeedDescriptor, FeedRegistry, HttpFetcher};
use feedreader::loader::{LoadError, LoadReport};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rss(channel: &str, items: &[&str]) -> String {
    let items: String = items
        .iter()
        .map(|title| {
            format!(
                "<item><guid>{channel}-{title}</guid><title>{title}</title>\
                 <link>https://example.com/{channel}/{title}</link></item>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>{channel}</title>{items}</channel></rss>"#
    )
}

async fn mock_feeds() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alpha"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("alpha", &["a1", "a2", "a3"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/beta"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss("beta", &["b1", "b2"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss("slow", &["s1"]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    server
}

fn config_for(server: &MockServer) -> Config {
    Config {
        feeds: vec![
            FeedDescriptor::new("Alpha Feed", format!("{}/alpha", server.uri())),
            FeedDescriptor::new("Beta Feed", format!("{}/beta", server.uri())),
            FeedDescriptor::new("Slow Feed", format!("{}/slow", server.uri())),
        ],
        fetch: FetchConfig {
            timeout_secs: 5,
            max_retries: 0,
            retry_backoff_ms: 1,
            ..FetchConfig::default()
        },
        ..Config::default()
    }
}

async fn session() -> (MockServer, Arc<App<HttpFetcher>>) {
    let server = mock_feeds().await;
    let app = App::from_config(&config_for(&server)).unwrap();
    (server, Arc::new(app))
}

// ============================================================================
// Registry
// ============================================================================

#[tokio::test]
async fn test_stock_feeds_are_defined_with_names_and_urls() {
    let app = App::from_config(&Config::default()).unwrap();
    let feeds = app.feeds();
    assert!(!feeds.is_empty());
    for feed in &feeds {
        assert!(!feed.name.is_empty());
        assert!(!feed.url.is_empty());
    }
    assert_eq!(feeds, FeedRegistry::default().iter().cloned().collect::<Vec<_>>());
}

// ============================================================================
// Initial load
// ============================================================================

#[tokio::test]
async fn test_initial_load_updates_title_and_entries() {
    let (_server, app) = session().await;
    let title_before = app.render().title();

    let report = app.load(0).await;

    assert!(report.is_rendered(), "load failed: {:?}", report.result);
    assert_ne!(app.render().title(), title_before);
    assert_eq!(app.render().title(), "Alpha Feed");
    assert!(app.render().entry_count() > 0);
    assert_eq!(app.snapshot().channel_title.as_deref(), Some("alpha"));
}

// ============================================================================
// Menu
// ============================================================================

#[tokio::test]
async fn test_menu_hidden_by_default_and_toggles() {
    let (_server, app) = session().await;
    assert!(app.menu().is_hidden());

    app.toggle_menu();
    assert!(!app.menu().is_hidden());
    app.toggle_menu();
    assert!(app.menu().is_hidden());
}

// ============================================================================
// New feed selection
// ============================================================================

#[tokio::test]
async fn test_chained_loads_close_menu_and_change_render() {
    let (_server, app) = session().await;
    app.toggle_menu();

    let (tx, rx) = oneshot::channel();
    let chained = Arc::clone(&app);
    app.load_then(0, move |first: LoadReport| {
        let after_first = chained.snapshot();
        let menu_closed_on_first = chained.menu().is_hidden();
        chained.load_then(1, move |second| {
            let _ = tx.send((first, after_first, menu_closed_on_first, second));
        });
    });

    let (first, after_first, menu_closed_on_first, second) = rx.await.unwrap();
    assert!(first.is_rendered());
    assert!(second.is_rendered());
    assert!(menu_closed_on_first);
    assert!(app.menu().is_hidden());

    let after_second = app.snapshot();
    assert_eq!(after_first.title, "Alpha Feed");
    assert_eq!(after_second.title, "Beta Feed");
    assert_ne!(after_first.entries, after_second.entries);
}

#[tokio::test]
async fn test_broken_feed_fails_gracefully() {
    let (server, app) = session().await;
    app.load(0).await;
    app.load(1).await;
    let before = app.snapshot();

    let index = app.append_feed(FeedDescriptor::new(
        "Broken feed",
        format!("{}/garbage", server.uri()),
    ));
    let report = app.load(index).await;
    app.remove_last_feed();

    assert!(matches!(report.result, Err(LoadError::Fetch(_))));
    assert_eq!(*app.snapshot(), *before);
}

#[tokio::test]
async fn test_missing_feed_404_keeps_render() {
    let (server, app) = session().await;
    app.load(0).await;
    let before = app.snapshot();

    let index = app.append_feed(FeedDescriptor::new(
        "Gone",
        format!("{}/does-not-exist", server.uri()),
    ));
    let report = app.load(index).await;
    app.remove_last_feed();

    assert!(!report.is_rendered());
    assert_eq!(*app.snapshot(), *before);
}

#[tokio::test]
async fn test_out_of_range_index_keeps_render() {
    let (_server, app) = session().await;
    app.load(1).await;
    let before = app.snapshot();
    app.toggle_menu();

    let report = app.load(app.feed_count()).await;

    assert!(matches!(report.result, Err(LoadError::Registry(_))));
    assert!(app.menu().is_hidden());
    assert_eq!(*app.snapshot(), *before);
}

#[tokio::test]
async fn test_repeated_load_is_idempotent() {
    let (_server, app) = session().await;
    app.load(1).await;
    let single = app.snapshot();

    let (a, b) = tokio::join!(app.load(1), app.load(1));
    assert!(a.is_rendered() && b.is_rendered());
    assert_eq!(*app.snapshot(), *single);
}

#[tokio::test]
async fn test_slow_feed_settling_last_wins() {
    let (_server, app) = session().await;

    let slow = app.load(2);
    let fast = app.load(0);
    let (slow, fast) = tokio::join!(slow, fast);

    assert!(slow.is_rendered() && fast.is_rendered());
    assert_eq!(app.render().title(), "Slow Feed");
}

#[tokio::test]
async fn test_loader_timeout_from_config() {
    let server = mock_feeds().await;
    let mut config = config_for(&server);
    config.load.timeout_secs = 1;
    config.feeds.push(FeedDescriptor::new(
        "Very slow",
        format!("{}/very-slow", server.uri()),
    ));
    Mock::given(method("GET"))
        .and(path("/very-slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss("very-slow", &["v1"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let app = App::from_config(&config).unwrap();

    app.load(0).await;
    let report = app.load(3).await;

    assert!(matches!(report.result, Err(LoadError::TimedOut(_))));
    assert_eq!(app.render().title(), "Alpha Feed");
}
