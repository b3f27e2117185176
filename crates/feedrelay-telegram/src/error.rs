use thiserror::Error;

// Variants carry the API method name, never the request URL: Telegram URLs
// embed the bot token.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("unexpected HTTP status {status} from {method}")]
    UnexpectedStatus { status: u16, method: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
