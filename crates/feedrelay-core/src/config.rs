use crate::app_config::{AppConfig, WatermarkPolicy};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The core parsing/validation logic, decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let bot_token = require("FEEDRELAY_BOT_TOKEN")?;

    let feeds_path = PathBuf::from(or_default("FEEDRELAY_FEEDS_PATH", "./config/feeds.yaml"));
    let log_level = or_default("FEEDRELAY_LOG_LEVEL", "info");
    let api_base_url = or_default("FEEDRELAY_API_BASE_URL", "https://api.telegram.org");
    let request_timeout_secs = parse_u64("FEEDRELAY_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("FEEDRELAY_USER_AGENT", "feedrelay/0.1 (+rss-notifier)");
    let max_rate_limit_retries = parse_u32("FEEDRELAY_MAX_RATE_LIMIT_RETRIES", "5")?;
    let watermark_policy =
        parse_watermark_policy(&or_default("FEEDRELAY_WATERMARK_POLICY", "any-novel"))?;

    Ok(AppConfig {
        bot_token,
        feeds_path,
        log_level,
        api_base_url,
        request_timeout_secs,
        user_agent,
        max_rate_limit_retries,
        watermark_policy,
    })
}

/// Parse a string into a `WatermarkPolicy` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values; a typo here
/// must not silently change delivery-loss semantics.
fn parse_watermark_policy(s: &str) -> Result<WatermarkPolicy, ConfigError> {
    match s {
        "any-novel" => Ok(WatermarkPolicy::AnyNovel),
        "delivered-only" => Ok(WatermarkPolicy::DeliveredOnly),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FEEDRELAY_WATERMARK_POLICY".to_string(),
            reason: format!("unknown policy '{other}' (expected any-novel or delivered-only)"),
        }),
    }
}
