//! # Dispatcher
//!
//! Result delivery module.
//!
//! Responsibilities:
//! - Build the enabled sinks from `OutputConfig`
//! - Fan out one `ResultDocument` to console, file and document store
//! - Apply the run's failure policy per sink and per insert

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod sinks;
pub mod store;

pub use contracts::{DataSink, DeliveryReport, ResultDocument};
pub use dispatcher::{DispatchReport, Dispatcher, SinkFailure};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{store_document, ConsoleSink, DocumentStoreSink, FileSink, OutputSink};
pub use store::{
    to_bson_document, DocumentStore, MemoryStore, MongoStore, StoreBackend, StoredDocument,
};
