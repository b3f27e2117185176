//! HTTP client for the Telegram Bot API.
//!
//! Wraps `reqwest` with Telegram-specific error handling: the JSON envelope's
//! `ok` field is checked on every call, and HTTP 429 is surfaced as
//! [`TelegramError::RateLimited`] carrying the server-advised delay.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::TelegramError;
use crate::rate_limit::retry_on_rate_limit;
use crate::types::Notification;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Telegram caps photo captions; longer bodies fall back to a text message
/// without the image.
pub const PHOTO_CAPTION_LIMIT: usize = 1024;

/// Advisory delay assumed when a 429 response carries none.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

/// Client for the Telegram Bot API.
///
/// Use [`TelegramClient::new`] for production or
/// [`TelegramClient::with_base_url`] to point at a mock server in tests.
pub struct TelegramClient {
    client: Client,
    token: String,
    base_url: String,
    max_rate_limit_retries: u32,
}

impl TelegramClient {
    /// Creates a client pointed at the production Telegram API.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        token: &str,
        timeout_secs: u64,
        max_rate_limit_retries: u32,
    ) -> Result<Self, TelegramError> {
        Self::with_base_url(token, timeout_secs, max_rate_limit_retries, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TelegramError::Api`] if `base_url` is not
    /// a valid URL.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        max_rate_limit_retries: u32,
        base_url: &str,
    ) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalized = base_url.trim_end_matches('/').to_string();
        Url::parse(&normalized)
            .map_err(|e| TelegramError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url: normalized,
            max_rate_limit_retries,
        })
    }

    /// Deliver one notification, retrying on rate limits.
    ///
    /// Sends a photo with the body as its caption when an image URL is
    /// present and the body fits [`PHOTO_CAPTION_LIMIT`]; a plain HTML text
    /// message otherwise.
    ///
    /// # Errors
    ///
    /// Returns the terminal [`TelegramError`] once the rate-limit budget is
    /// exhausted or a non-retryable failure occurs.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), TelegramError> {
        retry_on_rate_limit(self.max_rate_limit_retries, || self.send_once(notification)).await
    }

    async fn send_once(&self, notification: &Notification) -> Result<(), TelegramError> {
        match &notification.image_url {
            Some(image_url) if notification.html_body.chars().count() <= PHOTO_CAPTION_LIMIT => {
                self.send_photo(&notification.channel_id, image_url, &notification.html_body)
                    .await
            }
            _ => {
                self.send_message(&notification.channel_id, &notification.html_body)
                    .await
            }
        }
    }

    /// Send an HTML-formatted text message.
    ///
    /// # Errors
    ///
    /// See [`TelegramClient::deliver`]; this is a single attempt with no
    /// rate-limit retry.
    pub async fn send_message(&self, chat_id: &str, html: &str) -> Result<(), TelegramError> {
        self.post_method(
            "sendMessage",
            serde_json::json!({
                "chat_id": chat_id,
                "text": html,
                "parse_mode": "HTML",
            }),
        )
        .await
    }

    /// Send a photo by URL with an HTML caption.
    ///
    /// # Errors
    ///
    /// See [`TelegramClient::deliver`]; this is a single attempt with no
    /// rate-limit retry.
    pub async fn send_photo(
        &self,
        chat_id: &str,
        photo_url: &str,
        caption: &str,
    ) -> Result<(), TelegramError> {
        self.post_method(
            "sendPhoto",
            serde_json::json!({
                "chat_id": chat_id,
                "photo": photo_url,
                "caption": caption,
                "parse_mode": "HTML",
            }),
        )
        .await
    }

    async fn post_method(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> Result<(), TelegramError> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();

        // The Retry-After header must be read before the body consumes the
        // response; the JSON advisory takes precedence when both exist.
        let header_retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let body = response.text().await?;
        let envelope = serde_json::from_str::<ApiEnvelope>(&body);

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = envelope
                .as_ref()
                .ok()
                .and_then(|e| e.parameters.as_ref().and_then(|p| p.retry_after))
                .or(header_retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(TelegramError::RateLimited { retry_after_secs });
        }

        match envelope {
            Ok(env) if env.ok => Ok(()),
            Ok(env) => Err(TelegramError::Api(
                env.description
                    .unwrap_or_else(|| "unknown error".to_string()),
            )),
            Err(_) if !status.is_success() => Err(TelegramError::UnexpectedStatus {
                status: status.as_u16(),
                method: method.to_string(),
            }),
            Err(e) => Err(TelegramError::Deserialize {
                context: method.to_string(),
                source: e,
            }),
        }
    }
}
