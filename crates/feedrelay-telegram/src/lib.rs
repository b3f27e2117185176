//! Telegram Bot API delivery client.
//!
//! Sends notifications as HTML-formatted messages or photo captions,
//! translating HTTP 429 into a typed rate-limit error that the bounded
//! retry wrapper honors by sleeping the server-advised delay. Also home to
//! the content sanitizer that reduces arbitrary feed markup to the HTML
//! subset Telegram accepts.

pub mod client;
pub mod error;
pub mod sanitize;
pub mod types;

mod rate_limit;

pub use client::{TelegramClient, PHOTO_CAPTION_LIMIT};
pub use error::TelegramError;
pub use sanitize::sanitize_html;
pub use types::Notification;
