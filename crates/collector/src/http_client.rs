//! reqwest-backed API client with HTTP basic-auth

use std::fmt;
use std::time::Duration;

use contracts::ApiConfig;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::client::ApiClient;
use crate::error::{CollectorError, Result};

/// Static basic-auth id/key pair
#[derive(Clone)]
pub struct ApiCredentials {
    pub id: String,
    pub key: String,
}

impl ApiCredentials {
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("id", &self.id)
            .field("key", &"***")
            .finish()
    }
}

/// HTTP implementation of [`ApiClient`]
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    /// `{base_url}/{version}` without trailing slash
    root: String,
    credentials: ApiCredentials,
}

impl HttpApiClient {
    /// Create a client rooted at `{base_url}/{version}`
    pub fn new(
        base_url: &str,
        version: &str,
        credentials: ApiCredentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("allvis-harvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CollectorError::ClientSetup {
                message: e.to_string(),
            })?;

        let root = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            version.trim_matches('/')
        );

        Ok(Self {
            client,
            root,
            credentials,
        })
    }

    /// Create from the `[api]` section of the blueprint
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        Self::new(
            &api.base_url,
            &api.version,
            ApiCredentials::new(&api.api_id, &api.api_key),
            Duration::from_secs(api.timeout_secs),
        )
    }

    /// Full URL for a relative path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.root, path)
    }

    async fn fetch(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.id, Some(&self.credentials.key))
            .send()
            .await
            .map_err(|e| CollectorError::transport(url, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CollectorError::transport(url, format!("failed to read body: {e}")))?;

        // Error statuses still carry a JSON body that is kept as the payload
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), body = %body, "API returned an error status");
        }

        serde_json::from_str(&body).map_err(|e| CollectorError::malformed(url, e.to_string()))
    }
}

impl ApiClient for HttpApiClient {
    #[instrument(name = "api_get", skip(self), fields(path = %path))]
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.url_for(path);
        debug!(url = %url, "Requesting endpoint");

        let result = self.fetch(&url).await;
        observability::record_api_request(result.is_ok());
        result
    }
}
