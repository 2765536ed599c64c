//! # Collector
//!
//! Pulls monitoring data from the Allvis REST API.
//!
//! Responsibilities:
//! - Authenticated GETs against the versioned API root (HTTP or mock)
//! - Enumerate the organizations visible to the credential
//! - Fetch every configured endpoint per organization into one
//!   timestamped `ResultDocument`
//!
//! ## Usage Example
//!
//! ```ignore
//! use collector::{Aggregator, HttpApiClient, ZonedClock};
//!
//! let client = HttpApiClient::from_config(&blueprint.api)?;
//! let clock = ZonedClock::new(&blueprint.run.timezone)?;
//! let endpoints = blueprint.api.endpoint_set();
//!
//! let outcome = Aggregator::new(&client, &endpoints, &clock)
//!     .with_policy(blueprint.run.failure_policy)
//!     .collect()
//!     .await?;
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use collector::MockApiClient;
//!
//! let client = MockApiClient::new()
//!     .with_organizations(json!([{"id": "org1"}]))
//!     .with_org_response("org1", "groups", json!({"count": 0}));
//! ```

mod aggregator;
mod client;
mod clock;
mod enumerator;
mod error;
mod http_client;
mod mock_client;

// Re-exports
pub use aggregator::{Aggregator, CollectionOutcome, SkippedFetch};
pub use client::{organization_path, ApiClient, ORGANIZATIONS_PATH};
pub use clock::{Clock, FixedClock, ZonedClock};
pub use enumerator::list_organizations;
pub use error::{CollectorError, Result};
pub use http_client::{ApiCredentials, HttpApiClient};
pub use mock_client::{MockApiClient, MockFailure};
