//! Feed retrieval and tolerant parsing.
//!
//! Fetches RSS 2.0 / Atom documents over HTTP and extracts raw entries with
//! their field set intact: title, body markup, links in document order, and
//! every date-like field the dialect exposes. Date resolution across those
//! fields lives in [`dates`].

pub mod client;
pub mod dates;
pub mod error;
pub mod parse;
pub mod types;

pub use client::FeedFetcher;
pub use dates::{parse_date_flexible, resolve_entry_date};
pub use error::FeedError;
pub use parse::parse_feed;
pub use types::RawEntry;
