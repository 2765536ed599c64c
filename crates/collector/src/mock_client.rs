//! Mock API client
//!
//! In-memory implementation for tests; supports injected failures and
//! records every requested path.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tracing::instrument;

use crate::client::{organization_path, ApiClient, ORGANIZATIONS_PATH};
use crate::error::{CollectorError, Result};

/// Failure to inject for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Behave like a refused connection
    Transport,
    /// Behave like a non-JSON body
    Malformed,
}

/// Mock API client
#[derive(Debug, Default)]
pub struct MockApiClient {
    /// path -> canned body
    responses: HashMap<String, Value>,
    /// path -> injected failure
    failures: HashMap<String, MockFailure>,
    /// Requested paths, in order
    calls: Mutex<Vec<String>>,
}

impl MockApiClient {
    /// Create a mock with no canned responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `path`
    pub fn with_response(mut self, path: impl Into<String>, body: Value) -> Self {
        self.responses.insert(path.into(), body);
        self
    }

    /// Serve `body` as the organization list
    pub fn with_organizations(self, body: Value) -> Self {
        self.with_response(ORGANIZATIONS_PATH, body)
    }

    /// Serve `body` for sub-resource `suffix` of organization `org_id`
    pub fn with_org_response(self, org_id: &str, suffix: &str, body: Value) -> Self {
        self.with_response(organization_path(org_id, suffix), body)
    }

    /// Fail every request for `path`
    pub fn failing(mut self, path: impl Into<String>, failure: MockFailure) -> Self {
        self.failures.insert(path.into(), failure);
        self
    }

    /// Number of requests made so far
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Requested paths, in order
    pub fn calls(&self) -> Vec<String> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ApiClient for MockApiClient {
    #[instrument(name = "mock_api_get", skip(self), fields(path = %path))]
    async fn get(&self, path: &str) -> Result<Value> {
        self.lock_calls().push(path.to_string());

        match self.failures.get(path) {
            Some(MockFailure::Transport) => {
                return Err(CollectorError::transport(path, "mock connection refused"));
            }
            Some(MockFailure::Malformed) => {
                return Err(CollectorError::malformed(path, "mock body is not JSON"));
            }
            None => {}
        }

        self.responses
            .get(path)
            .cloned()
            .ok_or_else(|| CollectorError::transport(path, "no canned response"))
    }
}
