//! Notification composition: bold title, sanitized body, "Read more" link.

use feedrelay_feed::RawEntry;
use feedrelay_telegram::{sanitize_html, Notification};

/// Shown when an entry has no usable title.
const UNTITLED: &str = "(untitled)";

pub(crate) fn build_notification(channel_id: &str, entry: &RawEntry) -> Notification {
    Notification {
        channel_id: channel_id.to_string(),
        html_body: format_entry(entry),
        image_url: image_candidate(entry).map(str::to_string),
    }
}

/// Render an entry as a Telegram HTML body.
///
/// Bold title line, blank line, sanitized body, and a trailing "Read more"
/// hyperlink when the entry carries a link. Missing fields are omitted or
/// replaced rather than failing the entry.
pub(crate) fn format_entry(entry: &RawEntry) -> String {
    let title = entry
        .title
        .as_deref()
        .map(sanitize_html)
        .map(|t| t.replace('\n', " "))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut body = format!("<b>{title}</b>");

    if let Some(description) = entry.description.as_deref() {
        let clean = sanitize_html(description);
        if !clean.is_empty() {
            body.push_str("\n\n");
            body.push_str(&clean);
        }
    }

    if let Some(link) = entry.link.as_deref() {
        body.push_str(&format!("\n\n<a href=\"{link}\">Read more</a>"));
    }

    body
}

/// The illustrative image for an entry.
///
/// Inherited positional rule: the second associated link, when present and
/// non-empty, is treated as the image candidate. Swap this lookup for a
/// typed media field if the feed source ever provides one.
pub(crate) fn image_candidate(entry: &RawEntry) -> Option<&str> {
    entry
        .links
        .get(1)
        .map(String::as_str)
        .filter(|url| !url.trim().is_empty())
}
