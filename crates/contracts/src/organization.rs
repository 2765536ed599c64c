//! Organization - tenant entity returned by the organization list

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::OrganizationId;

/// An organization visible to the API credential.
///
/// Only `id` is interpreted. Every other upstream field is kept verbatim so
/// that the `org` entry of a result bundle reproduces the upstream object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Organization {
    /// Organization with no fields besides its id
    pub fn new(id: impl Into<OrganizationId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Parse one entry of the organization list
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
