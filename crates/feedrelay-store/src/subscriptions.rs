use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// One row of the mapping table: which feed goes to which channel, and the
/// timestamp of the newest entry already relayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSubscription {
    pub feed_url: String,
    pub channel_id: String,
    /// Stored as a string so hand-edited files with RFC 2822 or loose dates
    /// keep working; parsed into a timestamp at the start of a run.
    pub last_published_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionsFile {
    pub feeds: Vec<FeedSubscription>,
}

/// Load and validate the mapping store from a YAML file.
///
/// # Errors
///
/// Returns `StoreError` if the file cannot be read, parsed, or fails
/// validation (empty fields, duplicate feed URLs).
pub fn load_subscriptions(path: &Path) -> Result<SubscriptionsFile, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: SubscriptionsFile = serde_yaml::from_str(&content)?;
    validate_subscriptions(&file)?;

    Ok(file)
}

fn validate_subscriptions(file: &SubscriptionsFile) -> Result<(), StoreError> {
    let mut seen_urls = HashSet::new();

    for sub in &file.feeds {
        if sub.feed_url.trim().is_empty() {
            return Err(StoreError::Validation(
                "feed_url must be non-empty".to_string(),
            ));
        }
        if sub.channel_id.trim().is_empty() {
            return Err(StoreError::Validation(format!(
                "subscription for '{}' has an empty channel_id",
                sub.feed_url
            )));
        }
        if !seen_urls.insert(sub.feed_url.as_str()) {
            return Err(StoreError::Validation(format!(
                "duplicate feed URL: '{}'",
                sub.feed_url
            )));
        }
    }

    Ok(())
}

/// Rewrite one row's `last_published_date` cell and save the file.
///
/// The new watermark is written as RFC 3339 regardless of the format the cell
/// held before. The whole file is re-read and rewritten so concurrent manual
/// edits to other rows between load and commit are preserved.
///
/// # Errors
///
/// Returns [`StoreError::UnknownFeed`] if no row matches `feed_url`, or an
/// I/O / parse error if the file cannot be read back or written.
pub fn update_last_published(
    path: &Path,
    feed_url: &str,
    new_date: DateTime<Utc>,
) -> Result<(), StoreError> {
    let mut file = load_subscriptions(path)?;

    let row = file
        .feeds
        .iter_mut()
        .find(|s| s.feed_url == feed_url)
        .ok_or_else(|| StoreError::UnknownFeed(feed_url.to_string()))?;

    row.last_published_date = new_date.to_rfc3339();

    let rendered = serde_yaml::to_string(&file)?;
    std::fs::write(path, rendered).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    tracing::info!(feed_url, new_date = %new_date, "watermark persisted");
    Ok(())
}
