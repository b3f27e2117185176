//! HTTP retrieval of feed documents.

use std::time::Duration;

use reqwest::Client;

use crate::error::FeedError;
use crate::parse::parse_feed;
use crate::types::RawEntry;

/// Hard cap on feed document size. Anything larger is refused rather than
/// buffered into memory.
const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Fetches and parses one feed URL at a time.
///
/// Fetch failures are typed per feed; parse-level problems never fail a
/// fetch because [`parse_feed`] degrades to a partial entry list.
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    /// Creates a fetcher with the given total request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch `url` and parse it into raw entries.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`] on network failure.
    /// - [`FeedError::UnexpectedStatus`] on a non-2xx response.
    /// - [`FeedError::TooLarge`] when the advertised body exceeds the size cap.
    pub async fn fetch(&self, url: &str) -> Result<Vec<RawEntry>, FeedError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > MAX_FEED_SIZE {
                return Err(FeedError::TooLarge {
                    url: url.to_string(),
                    size: len,
                    max: MAX_FEED_SIZE,
                });
            }
        }

        let body = response.text().await?;
        Ok(parse_feed(&body))
    }
}
