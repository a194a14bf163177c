use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_HISTORY: usize = 20;
/// Largest accepted `CHAT_MAX_HISTORY`; every message is resent on each request.
pub const MAX_HISTORY_CEILING: usize = 1000;

/// Startup configuration for a chat session.
///
/// Built once, validated once, then handed to the client and coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_history: usize,
    pub timeout: Option<Duration>,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// Call `dotenv()` first if a `.env` file should be honored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("DEEPSEEK_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let base_url = match get("DEEPSEEK_BASE_URL") {
            Some(raw) => {
                Url::parse(&raw)
                    .map_err(|e| ConfigError::invalid("DEEPSEEK_BASE_URL", &raw, e.to_string()))?;
                raw.trim_end_matches('/').to_string()
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        let model = get("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = match get("DEEPSEEK_TEMPERATURE") {
            Some(raw) => {
                let value: f32 = raw
                    .parse()
                    .map_err(|_| ConfigError::invalid("DEEPSEEK_TEMPERATURE", &raw, "not a number"))?;
                if !(0.0..=2.0).contains(&value) {
                    return Err(ConfigError::invalid(
                        "DEEPSEEK_TEMPERATURE",
                        &raw,
                        "must be between 0.0 and 2.0",
                    ));
                }
                value
            }
            None => DEFAULT_TEMPERATURE,
        };

        let max_history = match get("CHAT_MAX_HISTORY") {
            Some(raw) => {
                let value: usize = raw
                    .parse()
                    .map_err(|_| ConfigError::invalid("CHAT_MAX_HISTORY", &raw, "not an integer"))?;
                if value < 2 {
                    return Err(ConfigError::invalid("CHAT_MAX_HISTORY", &raw, "must be at least 2"));
                }
                if value > MAX_HISTORY_CEILING {
                    return Err(ConfigError::invalid(
                        "CHAT_MAX_HISTORY",
                        &raw,
                        format!("must be at most {}", MAX_HISTORY_CEILING),
                    ));
                }
                value
            }
            None => DEFAULT_MAX_HISTORY,
        };

        let timeout = match get("DEEPSEEK_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| ConfigError::invalid("DEEPSEEK_TIMEOUT_SECS", &raw, "not an integer"))?;
                if secs == 0 {
                    return Err(ConfigError::invalid("DEEPSEEK_TIMEOUT_SECS", &raw, "must be positive"));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key,
            base_url,
            model,
            temperature,
            max_history,
            timeout,
        })
    }
}
