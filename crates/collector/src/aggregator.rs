//! Aggregator - builds the run's ResultDocument
//!
//! Timestamp first, then the organization list, then every configured
//! endpoint of every organization.

use contracts::{
    EndpointSet, FailurePolicy, OrgResultBundle, Organization, OrganizationId, ResultDocument,
};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::client::{organization_path, ApiClient};
use crate::clock::Clock;
use crate::enumerator::list_organizations;
use crate::error::Result;

/// An endpoint fetch that was skipped under [`FailurePolicy::BestEffort`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFetch {
    pub org_id: OrganizationId,
    pub endpoint: String,
    pub reason: String,
}

/// Result of a collection
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    /// The assembled aggregate
    pub document: ResultDocument,
    /// Fetches left out of the document (always empty under AllOrNothing)
    pub skipped: Vec<SkippedFetch>,
}

impl CollectionOutcome {
    /// Number of endpoint fetches that made it into the document
    pub fn fetched(&self) -> usize {
        self.document.payload_count()
    }
}

/// Collects one ResultDocument per call
///
/// Borrowed client, endpoints and clock are shared read-only for the whole
/// run. Organizations are processed in enumeration order; with
/// `concurrency > 1` up to that many organizations are in flight, each
/// filling its own bundle, and completed bundles are still taken in
/// enumeration order.
pub struct Aggregator<'a, C, K> {
    client: &'a C,
    endpoints: &'a EndpointSet,
    clock: &'a K,
    policy: FailurePolicy,
    concurrency: usize,
}

impl<'a, C: ApiClient, K: Clock> Aggregator<'a, C, K> {
    /// Sequential, all-or-nothing aggregator
    pub fn new(client: &'a C, endpoints: &'a EndpointSet, clock: &'a K) -> Self {
        Self {
            client,
            endpoints,
            clock,
            policy: FailurePolicy::AllOrNothing,
            concurrency: 1,
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Organizations fetched concurrently; values below 1 mean 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run a full collection
    ///
    /// # Errors
    /// Under `AllOrNothing` the first failure of any request aborts the
    /// collection and nothing is returned. Under `BestEffort` only the
    /// organization list is fatal; failed endpoint fetches are reported in
    /// [`CollectionOutcome::skipped`].
    #[instrument(
        name = "aggregator_collect",
        skip(self),
        fields(
            endpoints = self.endpoints.len(),
            policy = ?self.policy,
            concurrency = self.concurrency
        )
    )]
    pub async fn collect(&self) -> Result<CollectionOutcome> {
        let time_stamp = self.clock.now_iso();
        let organizations = list_organizations(self.client).await?;

        let mut document = ResultDocument::new(time_stamp);
        let mut skipped = Vec::new();

        let mut bundles = stream::iter(organizations)
            .map(|org| self.collect_organization(org))
            .buffered(self.concurrency);

        while let Some(result) = bundles.next().await {
            let (bundle, mut org_skipped) = result?;
            if document.results.contains_key(bundle.org.id.as_str()) {
                warn!(org_id = %bundle.org.id, "Duplicate organization id, keeping the last entry");
            }
            skipped.append(&mut org_skipped);
            document.insert_bundle(bundle);
        }

        info!(
            organizations = document.organization_count(),
            payloads = document.payload_count(),
            skipped = skipped.len(),
            "Collection complete"
        );

        Ok(CollectionOutcome { document, skipped })
    }

    #[instrument(name = "aggregator_collect_org", skip(self, org), fields(org_id = %org.id))]
    async fn collect_organization(
        &self,
        org: Organization,
    ) -> Result<(OrgResultBundle, Vec<SkippedFetch>)> {
        info!(org_id = %org.id, "Fetching results for organisation");

        let org_id = org.id.clone();
        let mut bundle = OrgResultBundle::new(org);
        let mut skipped = Vec::new();

        for endpoint in self.endpoints {
            let path = organization_path(org_id.as_str(), &endpoint.path);
            match self.client.get(&path).await {
                Ok(payload) => {
                    debug!(org_id = %org_id, endpoint = %endpoint.name, "Endpoint fetched");
                    bundle.set_payload(&endpoint.name, payload);
                }
                Err(e) if self.policy.isolates_failures() => {
                    warn!(
                        org_id = %org_id,
                        endpoint = %endpoint.name,
                        error = %e,
                        "Endpoint fetch failed, skipping"
                    );
                    observability::record_fetch_skipped(&endpoint.name);
                    skipped.push(SkippedFetch {
                        org_id: org_id.clone(),
                        endpoint: endpoint.name.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        observability::record_organization_collected();
        Ok((bundle, skipped))
    }
}
