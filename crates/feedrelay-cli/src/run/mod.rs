//! The per-feed diff-and-deliver pass.
//!
//! For each subscription: parse the stored watermark, fetch the feed, walk
//! entries oldest-to-newest, deliver the ones published after the watermark,
//! and persist the new high-water timestamp if it advanced. Failures are
//! isolated at the entry and feed level; only startup problems (bad config,
//! missing mapping store) abort the run.

mod message;

use anyhow::Context;
use chrono::{DateTime, Utc};

use feedrelay_core::{AppConfig, WatermarkPolicy};
use feedrelay_feed::{parse_date_flexible, resolve_entry_date, FeedFetcher, RawEntry};
use feedrelay_store::{load_subscriptions, update_last_published, FeedSubscription};
use feedrelay_telegram::TelegramClient;

use message::build_notification;

#[derive(Debug, Default)]
pub struct RunReport {
    pub feeds_processed: usize,
    pub feeds_failed: usize,
    pub entries_delivered: usize,
    pub entries_failed: usize,
    pub watermarks_advanced: usize,
}

struct FeedSummary {
    delivered: usize,
    failed: usize,
    advanced: bool,
}

/// One full pass over every configured feed.
///
/// # Errors
///
/// Returns an error only for startup-phase failures: an unreadable mapping
/// store or a client that cannot be constructed. Per-feed and per-entry
/// failures are logged and counted in the report instead.
pub async fn sweep(config: &AppConfig) -> anyhow::Result<RunReport> {
    let subscriptions =
        load_subscriptions(&config.feeds_path).context("loading the feed mapping store")?;
    tracing::info!(
        feeds = subscriptions.feeds.len(),
        store = %config.feeds_path.display(),
        "mapping table loaded"
    );

    let fetcher = FeedFetcher::new(config.request_timeout_secs, &config.user_agent)
        .context("building the feed fetcher")?;
    let telegram = TelegramClient::with_base_url(
        &config.bot_token,
        config.request_timeout_secs,
        config.max_rate_limit_retries,
        &config.api_base_url,
    )
    .context("building the Telegram client")?;

    let mut report = RunReport::default();
    for subscription in &subscriptions.feeds {
        match process_feed(config, &fetcher, &telegram, subscription).await {
            Ok(summary) => {
                report.feeds_processed += 1;
                report.entries_delivered += summary.delivered;
                report.entries_failed += summary.failed;
                if summary.advanced {
                    report.watermarks_advanced += 1;
                }
            }
            Err(e) => {
                tracing::error!(
                    feed_url = %subscription.feed_url,
                    channel_id = %subscription.channel_id,
                    error = %format!("{e:#}"),
                    "feed pass failed — continuing with the next feed"
                );
                report.feeds_failed += 1;
            }
        }
    }

    Ok(report)
}

async fn process_feed(
    config: &AppConfig,
    fetcher: &FeedFetcher,
    telegram: &TelegramClient,
    subscription: &FeedSubscription,
) -> anyhow::Result<FeedSummary> {
    let watermark = parse_date_flexible(&subscription.last_published_date).with_context(|| {
        format!(
            "unparsable stored watermark '{}'",
            subscription.last_published_date
        )
    })?;

    let entries = fetcher
        .fetch(&subscription.feed_url)
        .await
        .context("fetching feed")?;

    let novel = novel_entries(&entries, watermark);
    tracing::info!(
        feed_url = %subscription.feed_url,
        total = entries.len(),
        novel = novel.len(),
        watermark = %watermark,
        "feed fetched"
    );

    let mut high_water = watermark;
    let mut delivered = 0usize;
    let mut failed = 0usize;

    for (date, entry) in novel {
        let notification = build_notification(&subscription.channel_id, entry);
        match telegram.deliver(&notification).await {
            Ok(()) => {
                delivered += 1;
                high_water = high_water.max(date);
                tracing::info!(
                    feed_url = %subscription.feed_url,
                    channel_id = %subscription.channel_id,
                    link = entry.link.as_deref().unwrap_or("-"),
                    "entry delivered"
                );
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    feed_url = %subscription.feed_url,
                    channel_id = %subscription.channel_id,
                    link = entry.link.as_deref().unwrap_or("-"),
                    error = %e,
                    "entry delivery failed"
                );
                if config.watermark_policy == WatermarkPolicy::AnyNovel {
                    high_water = high_water.max(date);
                }
            }
        }
    }

    let advanced = high_water > watermark;
    if advanced {
        update_last_published(&config.feeds_path, &subscription.feed_url, high_water)
            .context("persisting the advanced watermark")?;
    }

    Ok(FeedSummary {
        delivered,
        failed,
        advanced,
    })
}

/// Entries strictly newer than `watermark`, in delivery order.
///
/// Feeds list newest first, so reverse traversal yields oldest-to-newest.
/// Entries with no resolvable date are skipped: they can neither be compared
/// to the watermark nor ordered.
fn novel_entries(
    entries: &[RawEntry],
    watermark: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, &RawEntry)> {
    let mut novel = Vec::new();
    for entry in entries.iter().rev() {
        let Some(date) = resolve_entry_date(entry) else {
            tracing::debug!(title = ?entry.title, "entry skipped — no resolvable date");
            continue;
        };
        if date > watermark {
            novel.push((date, entry));
        }
    }
    novel
}

/// Inspect the config and mapping store without touching the network.
///
/// # Errors
///
/// Returns an error if the mapping store cannot be loaded.
pub fn validate(config: &AppConfig) -> anyhow::Result<()> {
    let subscriptions =
        load_subscriptions(&config.feeds_path).context("loading the feed mapping store")?;
    println!(
        "{} feed(s) configured in {}",
        subscriptions.feeds.len(),
        config.feeds_path.display()
    );
    for subscription in &subscriptions.feeds {
        match parse_date_flexible(&subscription.last_published_date) {
            Some(dt) => println!(
                "  {} -> {} (watermark {})",
                subscription.feed_url, subscription.channel_id, dt
            ),
            None => println!(
                "  {} -> {} (WATERMARK UNPARSABLE: '{}')",
                subscription.feed_url, subscription.channel_id, subscription.last_published_date
            ),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "sweep_test.rs"]
mod tests;
