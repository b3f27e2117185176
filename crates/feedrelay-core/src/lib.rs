//! Application configuration for feedrelay.
//!
//! Everything the process needs at startup (bot token, mapping store path,
//! transport tuning) is resolved once into an [`AppConfig`] and passed down
//! by reference. There are no ambient globals.

use thiserror::Error;

pub mod app_config;
pub mod config;

pub use app_config::{AppConfig, WatermarkPolicy};
pub use config::{load_app_config, load_app_config_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
