//! Document store backends
//!
//! One database per organization id, one collection per endpoint name.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{ContractError, DocumentStoreOutput};
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, Credential};
use mongodb::Client;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Mongo-compatible document store
pub trait DocumentStore: Send + Sync {
    /// Human readable target for logs (never includes credentials)
    fn target(&self) -> &str;

    /// Run the `serverStatus` health probe
    fn server_status(&self) -> impl Future<Output = Result<Value, ContractError>> + Send;

    /// Insert one document into `database.collection`
    fn insert(
        &self,
        database: &str,
        collection: &str,
        document: Map<String, Value>,
    ) -> impl Future<Output = Result<(), ContractError>> + Send;
}

/// MongoDB / Cosmos DB (Mongo API) backend
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    target: String,
}

impl MongoStore {
    /// Build a client for `mongodb://{connection}` with the configured
    /// credentials attached
    ///
    /// No connection is made here; the driver connects on first use.
    pub async fn connect(config: &DocumentStoreOutput) -> Result<Self, ContractError> {
        let target = config
            .connection
            .split(['/', '?'])
            .next()
            .unwrap_or_default()
            .to_string();

        let mut options = ClientOptions::parse(format!("mongodb://{}", config.connection))
            .await
            .map_err(|e| ContractError::store(&target, format!("invalid connection: {e}")))?;

        options.app_name = Some("allvis-harvest".to_string());
        options.credential = Some(
            Credential::builder()
                .username(config.user.clone())
                .password(config.password.clone())
                .build(),
        );

        let client = Client::with_options(options)
            .map_err(|e| ContractError::store(&target, format!("client setup failed: {e}")))?;

        Ok(Self { client, target })
    }
}

impl DocumentStore for MongoStore {
    fn target(&self) -> &str {
        &self.target
    }

    #[instrument(name = "mongo_server_status", skip(self), fields(target = %self.target))]
    async fn server_status(&self) -> Result<Value, ContractError> {
        let status = self
            .client
            .database("admin")
            .run_command(doc! { "serverStatus": 1 })
            .await
            .map_err(|e| ContractError::store(&self.target, format!("serverStatus failed: {e}")))?;

        Ok(Bson::Document(status).into_relaxed_extjson())
    }

    #[instrument(name = "mongo_insert", skip(self, document), fields(target = %self.target))]
    async fn insert(
        &self,
        database: &str,
        collection: &str,
        document: Map<String, Value>,
    ) -> Result<(), ContractError> {
        let namespace = format!("{database}.{collection}");
        let document = to_bson_document(&document);

        let result = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .insert_one(document)
            .await
            .map_err(|e| ContractError::store(&namespace, e.to_string()))?;

        debug!(namespace = %namespace, id = %result.inserted_id, "Document inserted");
        Ok(())
    }
}

/// Convert a JSON object into a BSON document
///
/// Integers outside the `i64` range (e.g. `u64` byte counters) have no BSON
/// integer type and are stored as doubles.
pub fn to_bson_document(map: &Map<String, Value>) -> Document {
    map.iter()
        .map(|(key, value)| (key.clone(), to_bson(value)))
        .collect()
}

fn to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Bson::Int64(i),
            None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(to_bson).collect()),
        Value::Object(map) => Bson::Document(to_bson_document(map)),
    }
}

/// A document recorded by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub database: String,
    pub collection: String,
    pub document: Value,
}

#[derive(Debug, Default)]
struct MemoryState {
    inserts: Vec<StoredDocument>,
    probes: usize,
}

/// In-memory backend for tests and dry runs
///
/// Clones share the same state, so a test can keep one handle while the
/// sink owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    failing: Arc<HashSet<(String, String)>>,
    probe_fails: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject inserts into `database.collection`
    pub fn with_failure(mut self, database: &str, collection: &str) -> Self {
        let mut failing = (*self.failing).clone();
        failing.insert((database.to_string(), collection.to_string()));
        self.failing = Arc::new(failing);
        self
    }

    /// Make the health probe fail
    pub fn with_failing_probe(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    /// Documents inserted so far, in insertion order
    pub fn inserts(&self) -> Vec<StoredDocument> {
        self.lock().inserts.clone()
    }

    /// Number of health probes run
    pub fn probe_count(&self) -> usize {
        self.lock().probes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    fn target(&self) -> &str {
        "memory"
    }

    async fn server_status(&self) -> Result<Value, ContractError> {
        self.lock().probes += 1;
        if self.probe_fails {
            return Err(ContractError::store("memory", "probe failed"));
        }
        Ok(serde_json::json!({ "ok": 1.0, "host": "memory" }))
    }

    async fn insert(
        &self,
        database: &str,
        collection: &str,
        document: Map<String, Value>,
    ) -> Result<(), ContractError> {
        if self
            .failing
            .contains(&(database.to_string(), collection.to_string()))
        {
            return Err(ContractError::store(
                format!("{database}.{collection}"),
                "insert rejected",
            ));
        }

        self.lock().inserts.push(StoredDocument {
            database: database.to_string(),
            collection: collection.to_string(),
            document: Value::Object(document),
        });
        Ok(())
    }
}

/// Closed set of store backends
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Mongo(MongoStore),
    Memory(MemoryStore),
}

impl DocumentStore for StoreBackend {
    fn target(&self) -> &str {
        match self {
            Self::Mongo(store) => store.target(),
            Self::Memory(store) => store.target(),
        }
    }

    async fn server_status(&self) -> Result<Value, ContractError> {
        match self {
            Self::Mongo(store) => store.server_status().await,
            Self::Memory(store) => store.server_status().await,
        }
    }

    async fn insert(
        &self,
        database: &str,
        collection: &str,
        document: Map<String, Value>,
    ) -> Result<(), ContractError> {
        match self {
            Self::Mongo(store) => store.insert(database, collection, document).await,
            Self::Memory(store) => store.insert(database, collection, document).await,
        }
    }
}

impl From<MemoryStore> for StoreBackend {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

impl From<MongoStore> for StoreBackend {
    fn from(store: MongoStore) -> Self {
        Self::Mongo(store)
    }
}
