//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Nothing to deliver to
    #[error("no output sinks are enabled")]
    NoSinks,

    /// A sink failed and the policy does not isolate failures
    #[error("delivery to sink '{sink_name}' failed: {source}")]
    Delivery {
        sink_name: String,
        #[source]
        source: contracts::ContractError,
    },
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a delivery error
    pub fn delivery(sink_name: impl Into<String>, source: contracts::ContractError) -> Self {
        Self::Delivery {
            sink_name: sink_name.into(),
            source,
        }
    }
}
