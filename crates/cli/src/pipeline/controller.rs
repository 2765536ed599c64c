//! Run controller - guards and sequences one harvest run.
//!
//! `Idle -> Running -> {Succeeded, Failed}`. A run with no enabled output
//! fails before any client is built, so no request reaches the API.

use std::time::Instant;

use collector::{Aggregator, ApiClient, Clock, HttpApiClient, ZonedClock};
use config_loader::ConfigLoader;
use contracts::HarvestBlueprint;
use dispatcher::Dispatcher;
use tracing::{error, info, instrument, warn};

use super::RunStats;
use crate::error::RunFailure;

/// Lifecycle of a run
#[derive(Debug, Clone, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed(RunFailure),
}

/// Drives collection then delivery for one blueprint
pub struct RunController {
    blueprint: HarvestBlueprint,
    state: RunState,
}

impl RunController {
    pub fn new(blueprint: HarvestBlueprint) -> Self {
        Self {
            blueprint,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn blueprint(&self) -> &HarvestBlueprint {
        &self.blueprint
    }

    /// Run against the real API and the configured sinks
    ///
    /// # Errors
    /// * `NoOutputConfigured` before anything is built
    /// * `Setup` when credentials, timezone, HTTP client or a sink cannot
    ///   be prepared
    /// * `Collection` / `Delivery` from the run itself
    #[instrument(name = "run_controller_run", skip(self))]
    pub async fn run(&mut self) -> Result<RunStats, RunFailure> {
        let started = Instant::now();

        if !self.blueprint.output.any_enabled() {
            return Err(self.fail(RunFailure::NoOutputConfigured, started));
        }

        let prepared = self.prepare().await;
        let (client, clock, mut dispatcher) = match prepared {
            Ok(parts) => parts,
            Err(failure) => return Err(self.fail(failure, started)),
        };

        self.run_with(&client, &clock, &mut dispatcher).await
    }

    async fn prepare(&self) -> Result<(HttpApiClient, ZonedClock, Dispatcher), RunFailure> {
        let blueprint = &self.blueprint;

        ConfigLoader::validate_credentials(blueprint)
            .map_err(|e| RunFailure::setup(e.to_string()))?;
        let client = HttpApiClient::from_config(&blueprint.api)
            .map_err(|e| RunFailure::setup(e.to_string()))?;
        let clock = ZonedClock::new(&blueprint.run.timezone)
            .map_err(|e| RunFailure::setup(e.to_string()))?;
        let dispatcher = Dispatcher::from_config(&blueprint.output, blueprint.run.failure_policy)
            .await
            .map_err(|e| RunFailure::setup(e.to_string()))?;

        Ok((client, clock, dispatcher))
    }

    /// Run with injected collaborators
    ///
    /// The dispatcher is checked first: without sinks the run fails with
    /// `NoOutputConfigured` and `client` is never called.
    #[instrument(
        name = "run_controller_run_with",
        skip(self, client, clock, dispatcher),
        fields(sinks = dispatcher.len())
    )]
    pub async fn run_with<C: ApiClient, K: Clock>(
        &mut self,
        client: &C,
        clock: &K,
        dispatcher: &mut Dispatcher,
    ) -> Result<RunStats, RunFailure> {
        let started = Instant::now();

        if dispatcher.is_empty() {
            return Err(self.fail(RunFailure::NoOutputConfigured, started));
        }

        self.state = RunState::Running;
        let run = &self.blueprint.run;
        info!(
            sinks = ?dispatcher.sink_names(),
            policy = ?run.failure_policy,
            concurrency = run.concurrency,
            "Harvest run started"
        );

        let endpoints = self.blueprint.api.endpoint_set();
        let collected = Aggregator::new(client, &endpoints, clock)
            .with_policy(run.failure_policy)
            .with_concurrency(run.concurrency)
            .collect()
            .await;
        let outcome = match collected {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(RunFailure::Collection(e), started)),
        };

        let report = match dispatcher.dispatch(&outcome.document).await {
            Ok(report) => report,
            Err(e) => return Err(self.fail(RunFailure::delivery(e.to_string()), started)),
        };

        let stats = RunStats::from_run(&outcome, &report, started.elapsed());

        if !report.is_clean() {
            let message = report
                .failed
                .iter()
                .map(|f| format!("{}: {}", f.sink_name, f.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(self.fail(RunFailure::delivery(message), started));
        }

        if stats.is_partial() {
            warn!(
                skipped_fetches = stats.skipped_fetches,
                skipped_inserts = stats.documents_skipped,
                "Run completed with skipped items"
            );
        }

        self.state = RunState::Succeeded;
        observability::record_run("succeeded", stats.duration.as_secs_f64());
        info!(
            organizations = stats.organizations,
            documents = stats.documents_written,
            duration_secs = stats.duration.as_secs_f64(),
            "Mission complete!"
        );

        Ok(stats)
    }

    fn fail(&mut self, failure: RunFailure, started: Instant) -> RunFailure {
        error!(reason = %failure, "Harvest run failed");
        observability::record_run(failure.label(), started.elapsed().as_secs_f64());
        self.state = RunState::Failed(failure.clone());
        failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector::{FixedClock, MockApiClient, MockFailure};
    use config_loader::ConfigFormat;
    use dispatcher::{DocumentStoreSink, FileSink, MemoryStore};
    use contracts::FailurePolicy;
    use serde_json::json;

    fn blueprint(outputs: &str) -> HarvestBlueprint {
        let content = format!(
            r#"
[api]
api_id = "id"
api_key = "key"

[api.endpoints]
contacts = "contacts"

{outputs}
"#
        );
        ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap()
    }

    fn client() -> MockApiClient {
        MockApiClient::new()
            .with_organizations(json!([{"id": "A"}, {"id": "B"}]))
            .with_org_response("A", "contacts", json!({"owner": "A"}))
            .with_org_response("B", "contacts", json!({"owner": "B"}))
    }

    #[tokio::test]
    async fn test_no_output_fails_before_building_anything() {
        let mut controller = RunController::new(blueprint(""));

        let failure = controller.run().await.unwrap_err();

        assert!(matches!(failure, RunFailure::NoOutputConfigured));
        assert!(matches!(
            controller.state(),
            RunState::Failed(RunFailure::NoOutputConfigured)
        ));
        assert_eq!(failure.exit_code(), crate::error::EXIT_CONFIGURATION);
    }

    #[tokio::test]
    async fn test_no_sink_means_no_api_calls() {
        let client = client();
        let mut dispatcher = Dispatcher::with_sinks(Vec::new(), FailurePolicy::AllOrNothing);
        let mut controller = RunController::new(blueprint(""));

        let failure = controller
            .run_with(&client, &FixedClock::new("t"), &mut dispatcher)
            .await
            .unwrap_err();

        assert!(matches!(failure, RunFailure::NoOutputConfigured));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_setup_failure() {
        let content = r#"
[api]
base_url = "http://127.0.0.1:9"

[output.console]
enabled = true
"#;
        let bp = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        let mut controller = RunController::new(bp);

        let failure = controller.run().await.unwrap_err();
        assert!(matches!(failure, RunFailure::Setup { .. }), "got: {failure:?}");
        assert!(failure.is_configuration());
    }

    #[tokio::test]
    async fn test_successful_run() {
        let store = MemoryStore::new();
        let mut dispatcher = Dispatcher::with_sinks(
            vec![DocumentStoreSink::new("document_store", store.clone()).into()],
            FailurePolicy::AllOrNothing,
        );
        let mut controller = RunController::new(blueprint(""));

        let stats = controller
            .run_with(&client(), &FixedClock::new("2024-05-01T10:00:00+02:00"), &mut dispatcher)
            .await
            .unwrap();

        assert!(matches!(controller.state(), RunState::Succeeded));
        assert_eq!(stats.organizations, 2);
        assert_eq!(stats.endpoint_fetches, 2);
        assert_eq!(stats.documents_written, 2);
        assert_eq!(stats.time_stamp, "2024-05-01T10:00:00+02:00");
        assert_eq!(store.inserts().len(), 2);
    }

    #[tokio::test]
    async fn test_collection_failure_delivers_nothing() {
        let store = MemoryStore::new();
        let mut dispatcher = Dispatcher::with_sinks(
            vec![DocumentStoreSink::new("document_store", store.clone()).into()],
            FailurePolicy::AllOrNothing,
        );
        let client = client().failing("org/B/contacts", MockFailure::Transport);
        let mut controller = RunController::new(blueprint(""));

        let failure = controller
            .run_with(&client, &FixedClock::new("t"), &mut dispatcher)
            .await
            .unwrap_err();

        assert!(matches!(failure, RunFailure::Collection(_)));
        assert_eq!(failure.exit_code(), crate::error::EXIT_RUNTIME_FAILURE);
        assert!(store.inserts().is_empty());
        assert_eq!(store.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_best_effort_sink_failure_fails_run_after_all_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let mut dispatcher = Dispatcher::with_sinks(
            vec![
                FileSink::new("file", dir.path()).into(),
                DocumentStoreSink::new("document_store", store.clone()).into(),
            ],
            FailurePolicy::BestEffort,
        );
        let mut controller = RunController::new(blueprint(
            r#"
[run]
failure_policy = "best_effort"
"#,
        ));

        let failure = controller
            .run_with(&client(), &FixedClock::new("t"), &mut dispatcher)
            .await
            .unwrap_err();

        assert!(matches!(failure, RunFailure::Delivery { .. }));
        assert!(failure.to_string().contains("file"));
        assert_eq!(store.inserts().len(), 2);
    }
}
