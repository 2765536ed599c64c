//! Error types for CLI operations.

use collector::CollectorError;
use contracts::ContractError;
use thiserror::Error;

/// Exit code for a successful run
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for a runtime failure during collection or delivery
pub const EXIT_RUNTIME_FAILURE: u8 = 1;
/// Exit code for misconfiguration; no network activity was attempted
pub const EXIT_CONFIGURATION: u8 = 2;

/// Why a harvest run ended in `Failed`
#[derive(Error, Debug, Clone)]
pub enum RunFailure {
    /// Every sink is disabled
    #[error("No outputs are enabled! Enable at least one of [output.console], [output.file] or [output.document_store]")]
    NoOutputConfigured,

    /// Client, clock or sink could not be built from configuration
    #[error("Run setup failed: {message}")]
    Setup { message: String },

    /// The aggregator aborted
    #[error("Collection failed: {0}")]
    Collection(#[from] CollectorError),

    /// One or more sinks failed
    #[error("Delivery failed: {message}")]
    Delivery { message: String },
}

impl RunFailure {
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
        }
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }

    /// Failure happened before any request was sent
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NoOutputConfigured | Self::Setup { .. })
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_configuration() {
            EXIT_CONFIGURATION
        } else {
            EXIT_RUNTIME_FAILURE
        }
    }

    /// Short label for metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoOutputConfigured => "no_output_configured",
            Self::Setup { .. } => "setup_failed",
            Self::Collection(_) => "collection_failed",
            Self::Delivery { .. } => "delivery_failed",
        }
    }
}

/// Map a command error to the process exit code
///
/// Configuration problems (unreadable or invalid config, missing
/// credentials, no outputs) map to [`EXIT_CONFIGURATION`]; everything else
/// is a runtime failure.
pub fn exit_code_for(error: &anyhow::Error) -> u8 {
    if let Some(failure) = error.downcast_ref::<RunFailure>() {
        return failure.exit_code();
    }
    if let Some(contract) = error.downcast_ref::<ContractError>() {
        if contract.is_configuration() {
            return EXIT_CONFIGURATION;
        }
    }
    EXIT_RUNTIME_FAILURE
}
