//! Sink implementations
//!
//! Contains ConsoleSink, FileSink and DocumentStoreSink, plus the closed
//! [`OutputSink`] set the dispatcher iterates over.

mod console;
mod document_store;
mod file;

use contracts::{ContractError, DataSink, DeliveryReport, ResultDocument};

pub use self::console::ConsoleSink;
pub use self::document_store::{store_document, DocumentStoreSink};
pub use self::file::FileSink;

/// Every sink the harvester can deliver to
pub enum OutputSink {
    Console(ConsoleSink),
    File(FileSink),
    DocumentStore(DocumentStoreSink),
}

impl DataSink for OutputSink {
    fn name(&self) -> &str {
        match self {
            Self::Console(sink) => sink.name(),
            Self::File(sink) => sink.name(),
            Self::DocumentStore(sink) => sink.name(),
        }
    }

    async fn deliver(&mut self, document: &ResultDocument) -> Result<DeliveryReport, ContractError> {
        match self {
            Self::Console(sink) => sink.deliver(document).await,
            Self::File(sink) => sink.deliver(document).await,
            Self::DocumentStore(sink) => sink.deliver(document).await,
        }
    }
}

impl From<ConsoleSink> for OutputSink {
    fn from(sink: ConsoleSink) -> Self {
        Self::Console(sink)
    }
}

impl From<FileSink> for OutputSink {
    fn from(sink: FileSink) -> Self {
        Self::File(sink)
    }
}

impl From<DocumentStoreSink> for OutputSink {
    fn from(sink: DocumentStoreSink) -> Self {
        Self::DocumentStore(sink)
    }
}
