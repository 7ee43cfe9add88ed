use futures::StreamExt;
use thiserror::Error;

use super::normalize::{normalize_items, Post};
use super::parser::{parse_items, ParseError};

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching the station feed.
///
/// `Network`, `HttpStatus` and `ResponseTooLarge` are transport failures;
/// `Parse` means the body arrived but was not usable RSS.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network-level error (DNS, connection, TLS, timeout, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Feed XML was malformed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl FeedError {
    /// True for failures of the transport rather than the document.
    pub fn is_network(&self) -> bool {
        !matches!(self, FeedError::Parse(_))
    }
}

/// Fetches the feed at `url` and returns its posts in feed order.
///
/// Every call is a fresh GET with no caching or retry; the caller replaces
/// whatever it showed before with the returned batch.
///
/// # Errors
///
/// - [`FeedError::Network`] - connection, TLS, or client timeout errors
/// - [`FeedError::HttpStatus`] - non-2xx response
/// - [`FeedError::ResponseTooLarge`] - body over 10MB
/// - [`FeedError::Parse`] - malformed XML
pub async fn fetch_posts(client: &reqwest::Client, url: &str) -> Result<Vec<Post>, FeedError> {
    tracing::debug!(url = %url, "Fetching feed");

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FeedError::HttpStatus(response.status().as_u16()));
    }

    let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
    let posts = parse_feed(&bytes)?;

    tracing::info!(url = %url, posts = posts.len(), "Feed loaded");
    Ok(posts)
}

/// Parses an RSS document into normalized posts without touching the network.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Post>, FeedError> {
    let items = parse_items(bytes)?;
    Ok(normalize_items(items))
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FeedError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FeedError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FeedError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>Test</title><link>https://radioradiox.com/test</link></item>
</channel></rss>"#;

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let posts = fetch_posts(&client, &format!("{}/feed/", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Test");
        assert_eq!(posts[0].link, "https://radioradiox.com/test");
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_posts(&client, &format!("{}/feed/", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::HttpStatus(404)));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_fetch_500_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_posts(&client, &format!("{}/feed/", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_malformed_feed_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss><channel><item></channel>"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let err = fetch_posts(&client, &format!("{}/feed/", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
        assert!(!err.is_network());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop a server so the port is closed
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let client = reqwest::Client::new();
        let err = fetch_posts(&client, &format!("{}/feed/", uri))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Network(_)));
    }

    #[test]
    fn test_empty_channel_yields_no_posts() {
        let empty = r#"<rss version="2.0"><channel></channel></rss>"#;
        assert!(parse_feed(empty.as_bytes()).unwrap().is_empty());
    }
}
