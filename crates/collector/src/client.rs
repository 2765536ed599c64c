//! Monitoring API client abstraction
//!
//! Defines the trait the enumerator and aggregator fetch through, so the
//! HTTP implementation and the mock are interchangeable.

use std::future::Future;

use serde_json::Value;

use crate::error::Result;

/// Authenticated read access to the monitoring API
///
/// Credentials and base URL are bound when the client is built; callers
/// only pass the path relative to the versioned API root.
pub trait ApiClient: Send + Sync {
    /// GET `path` and parse the body as JSON
    ///
    /// # Arguments
    /// * `path` - Relative path, e.g. "org" or "org/{id}/groups"
    ///
    /// # Errors
    /// * `Transport` on connection failure or an unreadable body
    /// * `MalformedResponse` when the body is not valid JSON
    ///
    /// No caching and no retries: a failure is returned immediately.
    fn get(&self, path: &str) -> impl Future<Output = Result<Value>> + Send;
}

/// Relative path of the organization list
pub const ORGANIZATIONS_PATH: &str = "org";

/// Relative path of one organization sub-resource
///
/// An empty suffix yields `org/{id}/`, the organization metadata resource.
pub fn organization_path(org_id: &str, suffix: &str) -> String {
    format!("{ORGANIZATIONS_PATH}/{org_id}/{suffix}")
}
