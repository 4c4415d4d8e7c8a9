//! Error types shared across the gateway, export and configuration layers.

use crate::api::Endpoint;

/// Any failure of a single gateway call.
///
/// Transport errors, non-2xx statuses and undecodable bodies all land here;
/// callers treat every variant the same way ("the request failed").
#[derive(Debug, Clone, thiserror::Error)]
#[error("request to {endpoint} failed: {cause}")]
pub struct FetchError {
    pub endpoint: Endpoint,
    pub cause: String,
}

impl FetchError {
    pub fn new(endpoint: Endpoint, cause: impl std::fmt::Display) -> Self {
        Self {
            endpoint,
            cause: cause.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to save export: {0}")]
    Save(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid date pattern: {0}")]
    Pattern(#[from] PatternError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("unsupported token '{0}'")]
    UnsupportedToken(String),

    #[error("pattern is empty")]
    Empty,
}
