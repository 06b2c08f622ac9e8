use crate::feed::parser::{parse_feed, ParseError, ParsedFeed};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; secfeed/0.1; +https://github.com/dhofheinz/secfeed)";
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB
const FEED_ACCEPT: &str = "application/rss+xml, application/xml, text/xml";

/// Why a single source could not be turned into a parsed feed.
///
/// Every variant is recoverable at the run level: the orchestrator records it
/// and moves on to the next source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered 429 Too Many Requests
    #[error("Rate limited (HTTP 429)")]
    RateLimited,
    /// Network-level error (DNS, connection, TLS, body read)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Any other non-2xx status
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request plus body read exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Body was not a feed we can decode
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }
}

/// Retrieves and decodes one feed. No retries happen at this level.
#[allow(async_fn_in_trait)]
pub trait FeedFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed, FetchError>;
}

/// [`FeedFetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpFetcher {
    /// Builds a client that identifies itself with `user_agent` and asks for
    /// feed content types.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FEED_ACCEPT));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(client, timeout))
    }

    /// Wraps an existing client (allows custom configuration in tests).
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            max_bytes: MAX_FEED_SIZE,
        }
    }

    /// Overrides the response size limit.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        // 429 is reported distinctly so the caller can cool down
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        read_limited_bytes(response, self.max_bytes).await
    }
}

impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedFeed, FetchError> {
        let bytes = tokio::time::timeout(self.timeout, self.fetch_bytes(url))
            .await
            .map_err(|_| FetchError::Timeout)??;

        let feed = parse_feed(&bytes)?;
        tracing::debug!(url = %url, items = feed.items.len(), bytes = bytes.len(), "Fetched feed");
        Ok(feed)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: trust an oversized Content-Length
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
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
    <item><guid>1</guid><title>Test</title></item>
</channel></rss>"#;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .mount(&mock_server)
            .await;

        let feed = fetcher()
            .fetch(&format!("{}/feed", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].id, "1");
    }

    #[tokio::test]
    async fn test_fetch_sends_identifying_headers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = fetcher().fetch(&mock_server.uri()).await;
        assert!(result.is_ok());

        // Compared as whole values; the accept list itself contains commas
        let requests = mock_server.received_requests().await.unwrap();
        let sent = |name: &str| {
            requests[0]
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        assert_eq!(sent("user-agent").as_deref(), Some(DEFAULT_USER_AGENT));
        assert_eq!(sent("accept").as_deref(), Some(FEED_ACCEPT));
    }

    #[tokio::test]
    async fn test_fetch_429_is_rate_limited() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1) // no retries inside the fetcher
            .mount(&mock_server)
            .await;

        let err = fetcher().fetch(&mock_server.uri()).await.unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_fetch_404_is_http_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        match fetcher().fetch(&mock_server.uri()).await.unwrap_err() {
            FetchError::HttpStatus(404) => {}
            e => panic!("Expected HttpStatus(404), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_fails_without_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = fetcher().fetch(&mock_server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(500)));
        assert!(!err.is_rate_limited());
    }

    #[tokio::test]
    async fn test_malformed_feed_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .mount(&mock_server)
            .await;

        match fetcher().fetch(&mock_server.uri()).await.unwrap_err() {
            FetchError::Parse(_) => {}
            e => panic!("Expected Parse error, got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .mount(&mock_server)
            .await;

        let err = fetcher()
            .with_max_bytes(16)
            .fetch(&mock_server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ResponseTooLarge));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_USER_AGENT, Duration::from_millis(200)).unwrap();
        let err = fetcher.fetch(&mock_server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }
}
