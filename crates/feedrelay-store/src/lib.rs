//! Feed-to-channel mapping store.
//!
//! A YAML file of rows `{feed_url, channel_id, last_published_date}`, the
//! single persisted state of the system. Supports loading all rows and
//! rewriting one row's watermark cell.

pub mod subscriptions;

pub use subscriptions::{
    load_subscriptions, update_last_published, FeedSubscription, SubscriptionsFile,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read mapping store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mapping store: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("mapping store validation failed: {0}")]
    Validation(String),

    #[error("no subscription for feed URL '{0}'")]
    UnknownFeed(String),
}
