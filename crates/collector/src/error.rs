//! Collector error types

use thiserror::Error;

/// Collector specific error
#[derive(Debug, Clone, Error)]
pub enum CollectorError {
    /// Connection failure, timeout or unreadable body
    #[error("transport error for '{resource}': {message}")]
    Transport { resource: String, message: String },

    /// Body is not valid JSON or does not have the expected shape
    #[error("malformed response from '{resource}': {message}")]
    MalformedResponse { resource: String, message: String },

    /// HTTP client could not be built
    #[error("failed to build API client: {message}")]
    ClientSetup { message: String },

    /// Timezone identifier not found in the tz database
    #[error("unknown timezone '{timezone}'")]
    InvalidTimezone { timezone: String },
}

impl CollectorError {
    /// Create transport error
    pub fn transport(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create malformed response error
    pub fn malformed(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, CollectorError>;
