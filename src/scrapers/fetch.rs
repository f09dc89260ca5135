//! Page fetching.
//!
//! The harvester only ever needs "GET this URL, give me the status and the
//! body", so that is all [`Fetcher`] asks for. [`HttpFetcher`] is the real
//! implementation on top of a single shared `reqwest::Client`; tests swap in
//! a canned stub so nothing touches the network.
//!
//! There is no retry and no caching: a failed request is reported to the
//! caller, which decides whether it is fatal for a source or just a skipped
//! candidate.

use crate::error::FetchError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Desktop Chrome on Windows 10; some of the sites serve a stripped page to
/// unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and body of a completed request, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Anything that can GET a page.
///
/// A non-2xx response is still `Ok`; only transport-level failures (DNS,
/// TLS, timeout, unreadable body) are errors.
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// [`Fetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client that sends `user_agent` on every request and gives up
    /// after `timeout`.
    ///
    /// # Errors
    ///
    /// [`FetchError::Client`] if the TLS backend cannot be initialised.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        debug!(status, bytes = body.len(), "Fetched page");
        Ok(FetchedPage { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StubFetcher;
    use super::*;

    #[test]
    fn test_is_success() {
        let page = |status| FetchedPage {
            status,
            body: String::new(),
        };
        assert!(page(200).is_success());
        assert!(page(204).is_success());
        assert!(!page(301).is_success());
        assert!(!page(404).is_success());
        assert!(!page(500).is_success());
    }

    #[test]
    fn test_http_fetcher_builds_with_defaults() {
        assert!(HttpFetcher::new(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT).is_ok());
    }

    #[tokio::test]
    async fn test_stub_fetcher_serves_and_records() {
        let fetcher = StubFetcher::new()
            .page("https://a.test/", 200, "<p>hi</p>")
            .unreachable("https://down.test/");

        let page = fetcher.fetch("https://a.test/").await.unwrap();
        assert_eq!(page.body, "<p>hi</p>");

        let missing = fetcher.fetch("https://a.test/missing").await.unwrap();
        assert_eq!(missing.status, 404);

        let err = fetcher.fetch("https://down.test/").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));

        assert_eq!(
            fetcher.requested(),
            vec!["https://a.test/", "https://a.test/missing", "https://down.test/"]
        );
    }
}
