//! DataSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{ContractError, ResultDocument};

/// Data output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(DataSink: Send)]
pub trait LocalDataSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver the run's aggregate
    ///
    /// The document is lent read-only; sinks never mutate it.
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn deliver(&mut self, document: &ResultDocument)
        -> Result<DeliveryReport, ContractError>;
}

/// Outcome of a successful delivery
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Documents written (1 for console/file, one per insert for stores)
    pub written: usize,
    /// Items skipped because of isolated failures
    pub skipped: usize,
}

impl DeliveryReport {
    /// Report for a sink that wrote the whole document at once
    pub fn single() -> Self {
        Self {
            written: 1,
            skipped: 0,
        }
    }
}
