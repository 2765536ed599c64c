//! DocumentStoreSink - writes every endpoint payload into a document store

use contracts::{
    ContractError, DataSink, DeliveryReport, DocumentStoreOutput, FailurePolicy, ResultDocument,
};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::store::{DocumentStore, MongoStore, StoreBackend};

/// Field holding a non-object payload once wrapped for storage
pub const WRAPPED_PAYLOAD_FIELD: &str = "payload";

/// Storable form of an endpoint payload
///
/// Objects are stored verbatim; arrays and scalars are wrapped as
/// `{"payload": ...}` since a stored document must be an object.
pub fn store_document(payload: &Value) -> Map<String, Value> {
    match payload {
        Value::Object(map) => map.clone(),
        other => {
            let mut map = Map::with_capacity(1);
            map.insert(WRAPPED_PAYLOAD_FIELD.to_string(), other.clone());
            map
        }
    }
}

/// Sink that inserts one document per (organization, endpoint)
///
/// Database = organization id, collection = endpoint name. The `org`
/// descriptor of each bundle is not stored.
pub struct DocumentStoreSink {
    name: String,
    store: StoreBackend,
    policy: FailurePolicy,
}

impl DocumentStoreSink {
    pub fn new(name: impl Into<String>, store: impl Into<StoreBackend>) -> Self {
        Self {
            name: name.into(),
            store: store.into(),
            policy: FailurePolicy::AllOrNothing,
        }
    }

    /// Create a Mongo-backed sink from the `[output.document_store]` section
    pub async fn from_config(
        name: impl Into<String>,
        config: &DocumentStoreOutput,
    ) -> Result<Self, ContractError> {
        let store = MongoStore::connect(config).await?;
        Ok(Self::new(name, store))
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Log the health probe; a failing probe does not block the writes
    async fn probe(&self) {
        match self.store.server_status().await {
            Ok(status) => {
                let host = status.get("host").cloned().unwrap_or_default();
                let version = status.get("version").cloned().unwrap_or_default();
                info!(
                    sink = %self.name,
                    target = %self.store.target(),
                    host = %host,
                    version = %version,
                    "Document store server status"
                );
                debug!(sink = %self.name, status = %status, "serverStatus");
            }
            Err(e) => {
                warn!(sink = %self.name, error = %e, "Document store health probe failed");
            }
        }
    }
}

impl DataSink for DocumentStoreSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "document_store_sink_deliver",
        skip(self, document),
        fields(
            sink = %self.name,
            target = %self.store.target(),
            organizations = document.organization_count()
        )
    )]
    async fn deliver(&mut self, document: &ResultDocument) -> Result<DeliveryReport, ContractError> {
        self.probe().await;

        let mut report = DeliveryReport::default();
        for (org_id, bundle) in &document.results {
            for (endpoint, payload) in &bundle.payloads {
                match self
                    .store
                    .insert(org_id.as_str(), endpoint, store_document(payload))
                    .await
                {
                    Ok(()) => report.written += 1,
                    Err(e) if self.policy.isolates_failures() => {
                        warn!(
                            sink = %self.name,
                            database = %org_id,
                            collection = %endpoint,
                            error = %e,
                            "Insert failed, skipping"
                        );
                        report.skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(
            sink = %self.name,
            written = report.written,
            skipped = report.skipped,
            "Results written to document store"
        );
        Ok(report)
    }
}
