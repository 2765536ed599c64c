//! ResultDocument - Aggregator output, Dispatcher input
//!
//! The single timestamped aggregate produced by one run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{Organization, OrganizationId};

/// Field name holding the organization inside a bundle
pub const ORG_FIELD: &str = "org";

/// Aggregate of one harvesting run
///
/// Serializes as `{"timeStamp": ..., "results": {<orgId>: {...}}}`.
/// `results` is ordered by organization id, so the serialized form does
/// not depend on the order in which organizations were fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    /// ISO-8601 timestamp with UTC offset, taken before the first fetch
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,

    /// Organization id -> bundle
    pub results: BTreeMap<OrganizationId, OrgResultBundle>,
}

impl ResultDocument {
    /// Create an empty document stamped with `time_stamp`
    pub fn new(time_stamp: impl Into<String>) -> Self {
        Self {
            time_stamp: time_stamp.into(),
            results: BTreeMap::new(),
        }
    }

    /// Store a bundle under its organization id
    pub fn insert_bundle(&mut self, bundle: OrgResultBundle) {
        self.results.insert(bundle.org.id.clone(), bundle);
    }

    /// Number of organizations in the document
    pub fn organization_count(&self) -> usize {
        self.results.len()
    }

    /// Total number of endpoint payloads across all organizations
    pub fn payload_count(&self) -> usize {
        self.results.values().map(|b| b.payloads.len()).sum()
    }
}

/// Per-organization entry: the organization plus one payload per endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgResultBundle {
    pub org: Organization,

    /// Endpoint name -> raw JSON payload
    #[serde(flatten)]
    pub payloads: BTreeMap<String, Value>,
}

impl OrgResultBundle {
    /// Start a bundle holding only the organization
    pub fn new(org: Organization) -> Self {
        Self {
            org,
            payloads: BTreeMap::new(),
        }
    }

    /// Set the payload fetched for endpoint `name`
    pub fn set_payload(&mut self, name: impl Into<String>, payload: Value) {
        self.payloads.insert(name.into(), payload);
    }

    /// Payload fetched for endpoint `name`
    pub fn payload(&self, name: &str) -> Option<&Value> {
        self.payloads.get(name)
    }
}
