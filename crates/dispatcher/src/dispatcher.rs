//! Dispatcher - fans one ResultDocument out to every enabled sink

use tracing::{error, info, instrument};

use contracts::{
    DataSink, DeliveryReport, FailurePolicy, OutputConfig, ResultDocument, SinkKind,
};

use crate::error::DispatcherError;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sinks::{ConsoleSink, DocumentStoreSink, FileSink, OutputSink};

/// A sink that failed under [`FailurePolicy::BestEffort`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    pub sink_name: String,
    pub message: String,
}

/// Per-sink outcome of one dispatch
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Sinks that accepted the document, in dispatch order
    pub delivered: Vec<(String, DeliveryReport)>,
    /// Sinks that failed (only populated under BestEffort)
    pub failed: Vec<SinkFailure>,
}

impl DispatchReport {
    /// Every sink succeeded
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn documents_written(&self) -> usize {
        self.delivered.iter().map(|(_, r)| r.written).sum()
    }

    pub fn documents_skipped(&self) -> usize {
        self.delivered.iter().map(|(_, r)| r.skipped).sum()
    }
}

struct SinkEntry {
    sink: OutputSink,
    metrics: SinkMetrics,
}

/// Create one sink from configuration
#[instrument(name = "dispatcher_create_sink", skip(output))]
async fn create_sink(
    kind: SinkKind,
    output: &OutputConfig,
    policy: FailurePolicy,
) -> Result<OutputSink, DispatcherError> {
    let name = kind.as_str();
    match kind {
        SinkKind::Console => Ok(ConsoleSink::new(name).into()),
        SinkKind::File => Ok(FileSink::from_config(name, &output.file).into()),
        SinkKind::DocumentStore => {
            let sink = DocumentStoreSink::from_config(name, &output.document_store)
                .await
                .map_err(|e| DispatcherError::sink_creation(name, e.to_string()))?;
            Ok(sink.with_policy(policy).into())
        }
    }
}

/// Delivers a document to each sink in order
///
/// Sinks do not coordinate. Under `AllOrNothing` the first failing sink
/// stops the dispatch; sinks already written are not rolled back. Under
/// `BestEffort` every sink is attempted and failures are collected in the
/// [`DispatchReport`].
pub struct Dispatcher {
    entries: Vec<SinkEntry>,
    policy: FailurePolicy,
}

impl Dispatcher {
    /// Build the enabled sinks of `output` in dispatch order
    #[instrument(name = "dispatcher_from_config", skip(output))]
    pub async fn from_config(
        output: &OutputConfig,
        policy: FailurePolicy,
    ) -> Result<Self, DispatcherError> {
        let kinds = output.enabled_kinds();
        let mut sinks = Vec::with_capacity(kinds.len());
        for kind in kinds {
            sinks.push(create_sink(kind, output, policy).await?);
        }
        Ok(Self::with_sinks(sinks, policy))
    }

    /// Create a dispatcher with custom sinks (for testing)
    pub fn with_sinks(sinks: Vec<OutputSink>, policy: FailurePolicy) -> Self {
        let entries = sinks
            .into_iter()
            .map(|sink| SinkEntry {
                sink,
                metrics: SinkMetrics::new(),
            })
            .collect();
        Self { entries, policy }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sink names in dispatch order
    pub fn sink_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.sink.name()).collect()
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.entries
            .iter()
            .map(|e| (e.sink.name().to_string(), e.metrics.snapshot()))
            .collect()
    }

    /// Deliver `document` to every sink
    ///
    /// # Errors
    /// * `NoSinks` when the dispatcher has no sinks
    /// * `Delivery` for the first failing sink under `AllOrNothing`
    #[instrument(
        name = "dispatcher_dispatch",
        skip(self, document),
        fields(sinks = self.entries.len(), policy = ?self.policy)
    )]
    pub async fn dispatch(
        &mut self,
        document: &ResultDocument,
    ) -> Result<DispatchReport, DispatcherError> {
        if self.entries.is_empty() {
            return Err(DispatcherError::NoSinks);
        }

        let mut report = DispatchReport::default();

        for entry in &mut self.entries {
            let name = entry.sink.name().to_string();
            match entry.sink.deliver(document).await {
                Ok(delivery) => {
                    entry.metrics.add_writes(delivery.written);
                    entry.metrics.add_skipped(delivery.skipped);
                    observability::record_sink_delivery(&name, true);
                    observability::record_documents_written(&name, delivery.written);
                    report.delivered.push((name, delivery));
                }
                Err(e) => {
                    entry.metrics.inc_failure_count();
                    observability::record_sink_delivery(&name, false);
                    error!(sink = %name, error = %e, "Sink delivery failed");

                    if !self.policy.isolates_failures() {
                        return Err(DispatcherError::delivery(name, e));
                    }
                    report.failed.push(SinkFailure {
                        sink_name: name,
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            documents = report.documents_written(),
            "Dispatch complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use contracts::{ConsoleOutput, FileOutput, OrgResultBundle, Organization};
    use serde_json::json;
    use tempfile::tempdir;

    fn document() -> ResultDocument {
        let mut document = ResultDocument::new("t");
        let mut bundle = OrgResultBundle::new(Organization::new("A"));
        bundle.set_payload("contacts", json!({"n": 1}));
        document.insert_bundle(bundle);
        document
    }

    #[tokio::test]
    async fn test_fanout_to_every_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        let store = MemoryStore::new();

        let mut dispatcher = Dispatcher::with_sinks(
            vec![
                FileSink::new("file", &path).into(),
                DocumentStoreSink::new("document_store", store.clone()).into(),
            ],
            FailurePolicy::AllOrNothing,
        );

        let report = dispatcher.dispatch(&document()).await.unwrap();

        assert!(report.is_clean());
        assert_eq!(report.documents_written(), 2);
        assert!(path.exists());
        assert_eq!(store.inserts().len(), 1);
        assert_eq!(dispatcher.metrics()[1].1.write_count, 1);
    }

    #[tokio::test]
    async fn test_first_failure_stops_under_all_or_nothing() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new();

        let mut dispatcher = Dispatcher::with_sinks(
            vec![
                FileSink::new("file", dir.path()).into(),
                DocumentStoreSink::new("document_store", store.clone()).into(),
            ],
            FailurePolicy::AllOrNothing,
        );

        let err = dispatcher.dispatch(&document()).await.unwrap_err();
        assert!(matches!(err, DispatcherError::Delivery { ref sink_name, .. } if sink_name == "file"));
        assert!(store.inserts().is_empty());
        assert_eq!(dispatcher.metrics()[0].1.failure_count, 1);
    }

    #[tokio::test]
    async fn test_best_effort_attempts_every_sink() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new();

        let mut dispatcher = Dispatcher::with_sinks(
            vec![
                FileSink::new("file", dir.path()).into(),
                DocumentStoreSink::new("document_store", store.clone()).into(),
            ],
            FailurePolicy::BestEffort,
        );

        let report = dispatcher.dispatch(&document()).await.unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.failed[0].sink_name, "file");
        assert_eq!(report.delivered.len(), 1);
        assert_eq!(store.inserts().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_dispatcher_refuses() {
        let mut dispatcher = Dispatcher::with_sinks(Vec::new(), FailurePolicy::AllOrNothing);
        assert!(dispatcher.is_empty());
        let err = dispatcher.dispatch(&document()).await.unwrap_err();
        assert!(matches!(err, DispatcherError::NoSinks));
    }

    #[tokio::test]
    async fn test_from_config_order() {
        let output = OutputConfig {
            console: ConsoleOutput { enabled: true },
            file: FileOutput {
                enabled: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let dispatcher = Dispatcher::from_config(&output, FailurePolicy::AllOrNothing)
            .await
            .unwrap();
        assert_eq!(dispatcher.sink_names(), vec!["console", "file"]);
    }

    #[tokio::test]
    async fn test_from_config_nothing_enabled() {
        let dispatcher = Dispatcher::from_config(&OutputConfig::default(), FailurePolicy::BestEffort)
            .await
            .unwrap();
        assert!(dispatcher.is_empty());
    }
}
