use thiserror::Error;

/// Raised while building a [`Config`](crate::config::Config) at startup.
///
/// These are fatal: the binary refuses to start a session without a valid
/// configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("DEEPSEEK_API_KEY environment variable is required")]
    MissingApiKey,

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a single streaming completion call.
///
/// Never surfaced to callers of `generate_response`; the coordinator logs it
/// and commits the fallback message instead.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("provider reported an error mid-stream: {0}")]
    Stream(String),

    #[error("malformed stream chunk: {0}")]
    MalformedChunk(#[from] serde_json::Error),

    #[error("completion timed out after {0:?}")]
    Timeout(std::time::Duration),
}
