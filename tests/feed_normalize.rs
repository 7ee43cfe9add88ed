//! Integration tests for loading the station feed: HTTP fetch through
//! XML parsing to display-ready posts.
//!
//! Each test starts its own mock server, so tests share no state.

use pretty_assertions::assert_eq;
use radiox::feed::{fetch_posts, FeedError, EXCERPT_MAX_CHARS};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATION_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>RadioRadioX</title>
    <item>
      <title>Hi &#8217;there&#8217;</title>
      <description>&lt;p&gt;Hello [&#8230;]&lt;/p&gt;</description>
      <category>News</category>
    </item>
    <item>
      <title><![CDATA[Late Night &#8211; Deep Cuts]]></title>
      <link>https://radioradiox.com/late-night</link>
      <dc:creator>DJ Nova</dc:creator>
      <pubDate>Tue, 05 Mar 2024 22:15:00 +0000</pubDate>
      <category>Shows</category>
      <category>Music</category>
      <description><![CDATA[<p>Tonight&nbsp;we dig into the <b>crates</b>.</p>]]></description>
    </item>
  </channel>
</rss>"#;

async fn serve(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(&server)
        .await;
    server
}

fn feed_url(server: &MockServer) -> String {
    format!("{}/feed/", server.uri())
}

// ============================================================================
// Normalization Through Fetch
// ============================================================================

#[tokio::test]
async fn test_station_item_is_cleaned() {
    let server = serve(STATION_FEED).await;
    let client = reqwest::Client::new();

    let posts = fetch_posts(&client, &feed_url(&server)).await.unwrap();
    assert_eq!(posts.len(), 2);

    let first = &posts[0];
    assert_eq!(first.id, "0");
    assert_eq!(first.title, "Hi 'there'");
    assert_eq!(first.excerpt, "Hello ...");
    assert_eq!(first.category, "NEWS");
    assert_eq!(first.author, "Staff");
    assert_eq!(first.link, "");
    assert_eq!(first.date, "");
}

#[tokio::test]
async fn test_full_item_uses_first_category_and_creator() {
    let server = serve(STATION_FEED).await;
    let client = reqwest::Client::new();

    let posts = fetch_posts(&client, &feed_url(&server)).await.unwrap();
    let second = &posts[1];

    assert_eq!(second.id, "1");
    assert_eq!(second.title, "Late Night – Deep Cuts");
    assert_eq!(second.link, "https://radioradiox.com/late-night");
    assert_eq!(second.author, "DJ Nova");
    assert_eq!(second.date, "Mar 5, 2024");
    assert_eq!(second.category, "SHOWS");
    assert_eq!(second.excerpt, "Tonight we dig into the crates.");
}

#[tokio::test]
async fn test_refetch_yields_identical_posts() {
    let server = serve(STATION_FEED).await;
    let client = reqwest::Client::new();
    let url = feed_url(&server);

    let first = fetch_posts(&client, &url).await.unwrap();
    let second = fetch_posts(&client, &url).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_long_description_is_cut_without_markup() {
    let paragraph = "<p>On air <em>tonight</em> &amp; every night. </p>".repeat(40);
    let feed = format!(
        r#"<rss version="2.0"><channel><item><title>Long</title><description><![CDATA[{}]]></description></item></channel></rss>"#,
        paragraph
    );
    let server = serve(&feed).await;
    let client = reqwest::Client::new();

    let posts = fetch_posts(&client, &feed_url(&server)).await.unwrap();
    let excerpt = &posts[0].excerpt;

    assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS);
    assert!(!excerpt.contains('<'));
    assert!(!excerpt.contains('>'));
    assert!(excerpt.starts_with("On air tonight"));
}

#[tokio::test]
async fn test_html_entities_in_escaped_markup() {
    let feed = r#"<rss version="2.0"><channel><item><title>Caf&eacute; &amp; Bar</title><description>&lt;p&gt;Live at the Caf&eacute; tonight &amp;hearts;&lt;/p&gt;</description></item></channel></rss>"#;
    let server = serve(feed).await;
    let client = reqwest::Client::new();

    let posts = fetch_posts(&client, &feed_url(&server)).await.unwrap();
    assert_eq!(posts[0].title, "Café & Bar");
    assert_eq!(posts[0].excerpt, "Live at the Café tonight &hearts;");
}

#[tokio::test]
async fn test_feed_without_items_is_empty() {
    let server = serve(r#"<rss version="2.0"><channel><title>Quiet</title></channel></rss>"#).await;
    let client = reqwest::Client::new();

    let posts = fetch_posts(&client, &feed_url(&server)).await.unwrap();
    assert!(posts.is_empty());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_missing_feed_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let client = reqwest::Client::new();

    let err = fetch_posts(&client, &feed_url(&server)).await.unwrap_err();
    assert!(matches!(err, FeedError::HttpStatus(404)));
    assert!(err.is_network());
}

#[tokio::test]
async fn test_garbage_body_is_parse_failure() {
    let server = serve("<rss><channel><item><title>broken</item></rss>").await;
    let client = reqwest::Client::new();

    let err = fetch_posts(&client, &feed_url(&server)).await.unwrap_err();
    assert!(matches!(err, FeedError::Parse(_)));
    assert!(!err.is_network());
}
