//! HarvestBlueprint - Config Loader output
//!
//! Describes a complete run: API access, endpoint map, failure policy and
//! output routing. Loaded once at process start and passed by reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Run-wide settings
    #[serde(default)]
    pub run: RunConfig,

    /// Monitoring API access
    pub api: ApiConfig,

    /// Output routing
    #[serde(default)]
    pub output: OutputConfig,
}

/// Run-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// IANA timezone used for the run timestamp (e.g. "Europe/Oslo")
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Abort-vs-continue decision for per-item failures
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Organizations collected concurrently (1 = fully sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            failure_policy: FailurePolicy::default(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_timezone() -> String {
    "Europe/Oslo".to_string()
}

fn default_concurrency() -> usize {
    1
}

/// What happens when a single fetch, insert or sink fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// First failure aborts the run; nothing partial is delivered
    #[default]
    AllOrNothing,
    /// Failed endpoint fetches, store inserts and sinks are skipped and
    /// reported; the organization list stays fatal
    BestEffort,
}

impl FailurePolicy {
    /// True when per-item failures are isolated instead of aborting
    pub fn isolates_failures(self) -> bool {
        matches!(self, Self::BestEffort)
    }
}

/// Monitoring API access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL, e.g. "https://api.allvis.no"
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Version path segment, e.g. "v0"
    #[serde(default = "default_api_version")]
    pub version: String,

    /// Basic-auth id
    #[serde(default)]
    pub api_id: String,

    /// Basic-auth key
    #[serde(default)]
    pub api_key: String,

    /// Logical endpoint name -> path suffix under `org/{id}/`
    #[serde(default = "default_endpoints")]
    pub endpoints: BTreeMap<String, String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.allvis.no".to_string()
}

fn default_api_version() -> String {
    "v0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_endpoints() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("orgInfo".to_string(), String::new()),
        ("nets".to_string(), "groups".to_string()),
        ("services".to_string(), "services".to_string()),
        ("contacts".to_string(), "contacts".to_string()),
    ])
}

impl ApiConfig {
    /// Closed endpoint set in deterministic (name-sorted) order
    pub fn endpoint_set(&self) -> EndpointSet {
        EndpointSet::from_map(&self.endpoints)
    }
}

/// Logical sub-resource name -> URL path suffix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub name: String,
    pub path: String,
}

impl EndpointDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The fixed, ordered set of endpoints fetched for every organization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointSet(Vec<EndpointDescriptor>);

impl EndpointSet {
    /// Build from a name -> path map; iteration follows the map order
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        Self(
            map.iter()
                .map(|(name, path)| EndpointDescriptor::new(name, path))
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EndpointDescriptor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|d| d.name.as_str())
    }
}

impl FromIterator<EndpointDescriptor> for EndpointSet {
    fn from_iter<I: IntoIterator<Item = EndpointDescriptor>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EndpointSet {
    type Item = &'a EndpointDescriptor;
    type IntoIter = std::slice::Iter<'a, EndpointDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Output routing; each sink is toggled independently
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub console: ConsoleOutput,

    #[serde(default)]
    pub file: FileOutput,

    #[serde(default)]
    pub document_store: DocumentStoreOutput,
}

impl OutputConfig {
    /// At least one sink is enabled
    pub fn any_enabled(&self) -> bool {
        !self.enabled_kinds().is_empty()
    }

    /// Enabled sinks in dispatch order
    pub fn enabled_kinds(&self) -> Vec<SinkKind> {
        let mut kinds = Vec::with_capacity(3);
        if self.console.enabled {
            kinds.push(SinkKind::Console);
        }
        if self.file.enabled {
            kinds.push(SinkKind::File);
        }
        if self.document_store.enabled {
            kinds.push(SinkKind::DocumentStore);
        }
        kinds
    }
}

/// Sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Pretty print to stdout
    Console,
    /// JSON file
    File,
    /// Mongo-compatible document store
    DocumentStore,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::File => "file",
            Self::DocumentStore => "document_store",
        }
    }
}

/// Console sink settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleOutput {
    #[serde(default)]
    pub enabled: bool,
}

/// File sink settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutput {
    #[serde(default)]
    pub enabled: bool,

    /// Target path, overwritten on every run
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Indent the JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Default for FileOutput {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_output_path(),
            pretty: false,
        }
    }
}

fn default_output_path() -> String {
    "allvis-results.json".to_string()
}

/// Document store sink settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStoreOutput {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Host list and options after `mongodb://`, e.g.
    /// "acct.mongo.cosmos.azure.com:10255/?ssl=true&replicaSet=globaldb&retrywrites=false"
    #[serde(default)]
    pub connection: String,
}
