use std::path::PathBuf;

/// Controls when a feed's watermark is allowed to advance past an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkPolicy {
    /// Advance past every novel entry with a resolvable date, whether or not
    /// its delivery succeeded. Failed entries are never re-sent.
    AnyNovel,
    /// Advance only past entries that were actually delivered. Failed entries
    /// are re-attempted on the next run (duplicates possible for later
    /// entries in the same batch).
    DeliveredOnly,
}

impl std::fmt::Display for WatermarkPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WatermarkPolicy::AnyNovel => write!(f, "any-novel"),
            WatermarkPolicy::DeliveredOnly => write!(f, "delivered-only"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bot_token: String,
    pub feeds_path: PathBuf,
    pub log_level: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_rate_limit_retries: u32,
    pub watermark_policy: WatermarkPolicy,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bot_token", &"[redacted]")
            .field("feeds_path", &self.feeds_path)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_rate_limit_retries", &self.max_rate_limit_retries)
            .field("watermark_policy", &self.watermark_policy)
            .finish()
    }
}
