//! Differ tests: unit coverage for the novelty filter plus end-to-end sweeps
//! against wiremock feed and Telegram servers.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feedrelay_core::{AppConfig, WatermarkPolicy};
use feedrelay_feed::RawEntry;
use feedrelay_store::load_subscriptions;

use super::{novel_entries, sweep};

const TOKEN: &str = "123456:test-token";

fn day(d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
}

fn dated_entry(title: &str, rfc2822: &str) -> RawEntry {
    RawEntry {
        title: Some(title.to_string()),
        date_fields: vec![("pubDate".to_string(), rfc2822.to_string())],
        ..RawEntry::default()
    }
}

// ---------------------------------------------------------------------------
// novel_entries unit tests
// ---------------------------------------------------------------------------

#[test]
fn novel_entries_reverses_to_oldest_first_and_filters_strictly() {
    // Feed order: newest first, as real feeds are.
    let entries = vec![
        dated_entry("day3", "Wed, 03 Jan 2024 00:00:00 GMT"),
        dated_entry("day2", "Tue, 02 Jan 2024 00:00:00 GMT"),
        dated_entry("day1", "Mon, 01 Jan 2024 00:00:00 GMT"),
    ];

    let novel = novel_entries(&entries, day(1));
    let titles: Vec<_> = novel
        .iter()
        .map(|(_, e)| e.title.as_deref().unwrap())
        .collect();
    assert_eq!(titles, vec!["day2", "day3"], "oldest-to-newest, strictly after watermark");
    assert_eq!(novel[0].0, day(2));
    assert_eq!(novel[1].0, day(3));
}

#[test]
fn entry_dated_at_watermark_is_not_novel() {
    let entries = vec![dated_entry("boundary", "Mon, 01 Jan 2024 00:00:00 GMT")];
    assert!(novel_entries(&entries, day(1)).is_empty());
}

#[test]
fn entry_without_resolvable_date_is_skipped() {
    let entries = vec![
        dated_entry("dated", "Tue, 02 Jan 2024 00:00:00 GMT"),
        RawEntry {
            title: Some("undated".to_string()),
            ..RawEntry::default()
        },
        RawEntry {
            title: Some("garbage date".to_string()),
            date_fields: vec![("pubDate".to_string(), "soonish".to_string())],
            ..RawEntry::default()
        },
    ];
    let novel = novel_entries(&entries, day(1));
    assert_eq!(novel.len(), 1);
    assert_eq!(novel[0].1.title.as_deref(), Some("dated"));
}

// ---------------------------------------------------------------------------
// End-to-end sweeps
// ---------------------------------------------------------------------------

fn rss_item(title: &str, link: &str, pub_date: &str) -> String {
    format!(
        "<item><title>{title}</title><link>{link}</link>\
         <description>Body of {title}</description>\
         <pubDate>{pub_date}</pubDate></item>"
    )
}

/// A newest-first feed of the given items.
fn rss_feed(items: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel><title>Test feed</title>{}</channel></rss>",
        items.join("")
    )
}

fn three_day_feed() -> String {
    rss_feed(&[
        rss_item("day3", "https://example.com/3", "Wed, 03 Jan 2024 00:00:00 GMT"),
        rss_item("day2", "https://example.com/2", "Tue, 02 Jan 2024 00:00:00 GMT"),
        rss_item("day1", "https://example.com/1", "Mon, 01 Jan 2024 00:00:00 GMT"),
    ])
}

fn write_store(feed_url: &str, watermark: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().expect("create temp store");
    let content = format!(
        "feeds:\n  - feed_url: {feed_url}\n    channel_id: '@chan'\n    last_published_date: '{watermark}'\n"
    );
    std::fs::write(file.path(), content).expect("write temp store");
    file
}

fn test_config(api_base_url: &str, feeds_path: PathBuf, policy: WatermarkPolicy) -> AppConfig {
    AppConfig {
        bot_token: TOKEN.to_string(),
        feeds_path,
        log_level: "info".to_string(),
        api_base_url: api_base_url.to_string(),
        request_timeout_secs: 5,
        user_agent: "feedrelay-test/0.1".to_string(),
        max_rate_limit_retries: 0,
        watermark_policy: policy,
    }
}

async fn mount_feed(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn telegram_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(&json!({"ok": true, "result": {"message_id": 1}}))
}

fn telegram_boom() -> ResponseTemplate {
    ResponseTemplate::new(500).set_body_json(&json!({"ok": false, "description": "Internal Server Error"}))
}

/// Watermark stored after the sweep, parsed back to a timestamp.
fn stored_watermark(store: &tempfile::NamedTempFile) -> chrono::DateTime<Utc> {
    let file = load_subscriptions(store.path()).expect("reload store");
    feedrelay_feed::parse_date_flexible(&file.feeds[0].last_published_date)
        .expect("stored watermark should parse")
}

#[tokio::test]
async fn sweep_delivers_novel_entries_in_order_and_commits_watermark() {
    let feed_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_feed(&feed_server, three_day_feed()).await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(telegram_ok())
        .expect(2)
        .mount(&telegram_server)
        .await;

    let store = write_store(
        &format!("{}/feed.xml", feed_server.uri()),
        "2024-01-01T00:00:00Z",
    );
    let config = test_config(
        &telegram_server.uri(),
        store.path().to_path_buf(),
        WatermarkPolicy::AnyNovel,
    );

    let report = sweep(&config).await.expect("sweep should succeed");
    assert_eq!(report.feeds_processed, 1);
    assert_eq!(report.entries_delivered, 2, "day2 and day3 only");
    assert_eq!(report.entries_failed, 0);
    assert_eq!(report.watermarks_advanced, 1);

    // Delivery order: oldest novel entry first.
    let requests = telegram_server.received_requests().await.unwrap();
    let texts: Vec<String> = requests
        .iter()
        .map(|r| {
            let payload: serde_json::Value =
                serde_json::from_slice(&r.body).expect("request body should be JSON");
            payload["text"].as_str().expect("text field").to_string()
        })
        .collect();
    assert_eq!(
        texts[0],
        "<b>day2</b>\n\nBody of day2\n\n<a href=\"https://example.com/2\">Read more</a>"
    );
    assert!(texts[1].starts_with("<b>day3</b>"), "second delivery: {}", texts[1]);

    assert_eq!(stored_watermark(&store), day(3));
}

#[tokio::test]
async fn sweep_sends_nothing_when_watermark_is_current() {
    let feed_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_feed(&feed_server, three_day_feed()).await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/bot.*"))
        .respond_with(telegram_ok())
        .expect(0)
        .mount(&telegram_server)
        .await;

    let store = write_store(
        &format!("{}/feed.xml", feed_server.uri()),
        "2024-01-03T00:00:00Z",
    );
    let config = test_config(
        &telegram_server.uri(),
        store.path().to_path_buf(),
        WatermarkPolicy::AnyNovel,
    );

    let report = sweep(&config).await.expect("sweep should succeed");
    assert_eq!(report.entries_delivered, 0);
    assert_eq!(report.watermarks_advanced, 0);
    assert_eq!(stored_watermark(&store), day(3), "watermark unchanged");
}

#[tokio::test]
async fn partial_failure_still_advances_under_any_novel() {
    let feed_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;
    mount_feed(&feed_server, three_day_feed()).await;

    // First delivery (day2) fails with a non-429; second (day3) succeeds.
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(telegram_boom())
        .up_to_n_times(1)
        .mount(&telegram_server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(telegram_ok())
        .mount(&telegram_server)
        .await;

    let store = write_store(
        &format!("{}/feed.xml", feed_server.uri()),
        "2024-01-01T00:00:00Z",
    );
    let config = test_config(
        &telegram_server.uri(),
        store.path().to_path_buf(),
        WatermarkPolicy::AnyNovel,
    );

    let report = sweep(&config).await.expect("sweep should succeed");
    assert_eq!(report.entries_delivered, 1);
    assert_eq!(report.entries_failed, 1);
    assert_eq!(stored_watermark(&store), day(3));
}

#[tokio::test]
async fn total_failure_advances_under_any_novel_but_not_delivered_only() {
    for (policy, expected_day) in [
        (WatermarkPolicy::AnyNovel, 3),
        (WatermarkPolicy::DeliveredOnly, 1),
    ] {
        let feed_server = MockServer::start().await;
        let telegram_server = MockServer::start().await;
        mount_feed(&feed_server, three_day_feed()).await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .respond_with(telegram_boom())
            .mount(&telegram_server)
            .await;

        let store = write_store(
            &format!("{}/feed.xml", feed_server.uri()),
            "2024-01-01T00:00:00Z",
        );
        let config = test_config(&telegram_server.uri(), store.path().to_path_buf(), policy);

        let report = sweep(&config).await.expect("sweep should succeed");
        assert_eq!(report.entries_delivered, 0, "policy {policy}");
        assert_eq!(report.entries_failed, 2, "policy {policy}");
        assert_eq!(
            stored_watermark(&store),
            day(expected_day),
            "policy {policy}"
        );
    }
}

#[tokio::test]
async fn unparsable_stored_watermark_skips_feed_without_fetching() {
    let feed_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(three_day_feed()))
        .expect(0)
        .mount(&feed_server)
        .await;

    let store = write_store(
        &format!("{}/feed.xml", feed_server.uri()),
        "not a date at all",
    );
    let config = test_config(
        &telegram_server.uri(),
        store.path().to_path_buf(),
        WatermarkPolicy::AnyNovel,
    );

    let report = sweep(&config).await.expect("sweep itself must not fail");
    assert_eq!(report.feeds_processed, 0);
    assert_eq!(report.feeds_failed, 1);
}

#[tokio::test]
async fn feed_fetch_failure_is_isolated_to_that_feed() {
    let feed_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&feed_server)
        .await;

    let store = write_store(
        &format!("{}/feed.xml", feed_server.uri()),
        "2024-01-01T00:00:00Z",
    );
    let config = test_config(
        &telegram_server.uri(),
        store.path().to_path_buf(),
        WatermarkPolicy::AnyNovel,
    );

    let report = sweep(&config).await.expect("sweep itself must not fail");
    assert_eq!(report.feeds_failed, 1);
    assert_eq!(stored_watermark(&store), day(1), "watermark untouched");
}

#[tokio::test]
async fn undated_entries_do_not_affect_delivery_or_watermark() {
    let feed_server = MockServer::start().await;
    let telegram_server = MockServer::start().await;

    let feed = rss_feed(&[
        rss_item("day2", "https://example.com/2", "Tue, 02 Jan 2024 00:00:00 GMT"),
        "<item><title>undated</title><link>https://example.com/u</link></item>".to_string(),
    ]);
    mount_feed(&feed_server, feed).await;

    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/sendMessage")))
        .respond_with(telegram_ok())
        .expect(1)
        .mount(&telegram_server)
        .await;

    let store = write_store(
        &format!("{}/feed.xml", feed_server.uri()),
        "2024-01-01T00:00:00Z",
    );
    let config = test_config(
        &telegram_server.uri(),
        store.path().to_path_buf(),
        WatermarkPolicy::AnyNovel,
    );

    let report = sweep(&config).await.expect("sweep should succeed");
    assert_eq!(report.entries_delivered, 1, "only the dated entry");
    assert_eq!(stored_watermark(&store), day(2));
}
