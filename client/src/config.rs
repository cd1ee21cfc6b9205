//! Configuration management for the stagepass client.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Gateway used when `STAGEPASS_GATEWAY_URL` is unset
pub const DEFAULT_GATEWAY_URL: &str = "https://apigateway-iota.vercel.app";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the API gateway
    pub gateway_url: String,
    /// Where the bearer token is persisted between runs
    pub token_path: PathBuf,
    /// Whether to send the derived `x-user-id` compatibility header
    pub send_user_id_header: bool,
    /// Minutes the user is told they have to pay for a reservation
    ///
    /// Informational; nothing enforces it on the client.
    pub payment_window_minutes: u32,
    /// Log filter used when `RUST_LOG` is unset (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            gateway_url: lookup("STAGEPASS_GATEWAY_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            token_path: lookup("STAGEPASS_TOKEN_PATH")
                .filter(|path| !path.trim().is_empty())
                .map_or_else(default_token_path, PathBuf::from),
            send_user_id_header: lookup("STAGEPASS_SEND_USER_ID_HEADER")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(true),
            payment_window_minutes: lookup("STAGEPASS_PAYMENT_WINDOW_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn default_token_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stagepass")
        .join("token")
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
