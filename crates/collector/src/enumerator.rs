//! Organization enumerator

use contracts::Organization;
use serde_json::Value;
use tracing::{info, instrument};

use crate::client::{ApiClient, ORGANIZATIONS_PATH};
use crate::error::{CollectorError, Result};

/// List every organization visible to the credential
///
/// Upstream order is preserved. Any failure here is fatal to the run since
/// no organization scope can be determined without it.
///
/// # Errors
/// * API client errors, unchanged
/// * `MalformedResponse` if the body is not an array of objects with a
///   string `id`
#[instrument(name = "list_organizations", skip(client))]
pub async fn list_organizations<C: ApiClient>(client: &C) -> Result<Vec<Organization>> {
    let body = client.get(ORGANIZATIONS_PATH).await?;

    let Value::Array(entries) = body else {
        return Err(CollectorError::malformed(
            ORGANIZATIONS_PATH,
            format!("expected a JSON array of organizations, got {}", kind(&body)),
        ));
    };

    let organizations = entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            Organization::from_value(entry).map_err(|e| {
                CollectorError::malformed(ORGANIZATIONS_PATH, format!("entry {idx}: {e}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(count = organizations.len(), "Organisations found");
    Ok(organizations)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_client::{MockApiClient, MockFailure};
    use serde_json::json;

    #[tokio::test]
    async fn test_preserves_upstream_order() {
        let client = MockApiClient::new()
            .with_organizations(json!([{"id": "z"}, {"id": "a"}, {"id": "m", "name": "Mid"}]));

        let orgs = list_organizations(&client).await.unwrap();
        let ids: Vec<&str> = orgs.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
        assert_eq!(orgs[2].fields.get("name"), Some(&json!("Mid")));
    }

    #[tokio::test]
    async fn test_empty_list() {
        let client = MockApiClient::new().with_organizations(json!([]));
        assert!(list_organizations(&client).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_array_body() {
        let client = MockApiClient::new().with_organizations(json!({"message": "Unauthorized"}));
        let err = list_organizations(&client).await.unwrap_err();
        assert!(err.to_string().contains("got an object"), "got: {err}");
    }

    #[tokio::test]
    async fn test_entry_without_id() {
        let client = MockApiClient::new().with_organizations(json!([{"id": "a"}, {"name": "x"}]));
        let err = list_organizations(&client).await.unwrap_err();
        assert!(matches!(err, CollectorError::MalformedResponse { .. }));
        assert!(err.to_string().contains("entry 1"), "got: {err}");
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let client = MockApiClient::new().failing("org", MockFailure::Transport);
        let err = list_organizations(&client).await.unwrap_err();
        assert!(matches!(err, CollectorError::Transport { .. }));
    }
}
