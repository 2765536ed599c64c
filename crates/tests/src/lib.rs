//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Wire shape of the result document
//! - Mock e2e runs (no API or document store required)
//! - Failure policy behaviour across collection and delivery

#[cfg(test)]
mod contract_tests {
    use contracts::{OrgResultBundle, Organization, ResultDocument};
    use serde_json::json;

    #[test]
    fn test_result_document_wire_shape() {
        let mut document = ResultDocument::new("2024-05-01T10:00:00.000000+02:00");
        let mut bundle = OrgResultBundle::new(Organization::new("org1"));
        bundle.set_payload("nets", json!({"count": 0}));
        document.insert_bundle(bundle);

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "timeStamp": "2024-05-01T10:00:00.000000+02:00",
                "results": {"org1": {"org": {"id": "org1"}, "nets": {"count": 0}}}
            })
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;

    use allvis_harvest_cli::{RunController, RunFailure, RunState};
    use collector::{Clock, FixedClock, MockApiClient, MockFailure, ZonedClock};
    use config_loader::ConfigLoader;
    use contracts::{FailurePolicy, HarvestBlueprint, ResultDocument};
    use dispatcher::{Dispatcher, DocumentStoreSink, FileSink, MemoryStore, StoredDocument};
    use serde_json::json;
    use tempfile::tempdir;

    const ORG_IDS: [&str; 5] = ["o1", "o2", "o3", "o4", "o5"];

    /// Write a config file and load it the way the CLI does
    fn load_blueprint(dir: &Path, extra: &str) -> HarvestBlueprint {
        let path = dir.join("allvis.toml");
        let content = format!(
            r#"
[api]
api_id = "id"
api_key = "key"

[api.endpoints]
orgInfo = ""
contacts = "contacts"

{extra}
"#
        );
        std::fs::write(&path, content).unwrap();
        ConfigLoader::load_from_path(&path).unwrap()
    }

    fn five_org_client() -> MockApiClient {
        let orgs: Vec<_> = ORG_IDS
            .iter()
            .map(|id| json!({"id": id, "name": format!("Org {id}")}))
            .collect();
        ORG_IDS.iter().fold(
            MockApiClient::new().with_organizations(json!(orgs)),
            |client, id| {
                client
                    .with_org_response(id, "", json!({"id": id, "active": true}))
                    .with_org_response(id, "contacts", json!([{"email": format!("ops@{id}")}]))
            },
        )
    }

    fn file_and_store(
        path: &Path,
        store: &MemoryStore,
        policy: FailurePolicy,
    ) -> Dispatcher {
        Dispatcher::with_sinks(
            vec![
                FileSink::new("file", path).into(),
                DocumentStoreSink::new("document_store", store.clone())
                    .with_policy(policy)
                    .into(),
            ],
            policy,
        )
    }

    /// Mocked API -> Aggregator -> file + document store
    #[tokio::test]
    async fn test_e2e_mock_run() {
        let dir = tempdir().unwrap();
        let blueprint = load_blueprint(dir.path(), "");
        let out = dir.path().join("allvis-results.json");
        let store = MemoryStore::new();
        let mut dispatcher = file_and_store(&out, &store, FailurePolicy::AllOrNothing);
        let client = five_org_client();
        let clock = FixedClock::new("2024-05-01T10:00:00.000000+02:00");

        let mut controller = RunController::new(blueprint);
        let stats = controller
            .run_with(&client, &clock, &mut dispatcher)
            .await
            .unwrap();

        assert!(matches!(controller.state(), RunState::Succeeded));
        assert_eq!(stats.organizations, 5);
        assert_eq!(stats.endpoint_fetches, 10);
        // 1 file + 10 inserts
        assert_eq!(stats.documents_written, 11);
        // org list + 2 endpoints per organization
        assert_eq!(client.call_count(), 11);

        let written: ResultDocument =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(written.time_stamp, "2024-05-01T10:00:00.000000+02:00");
        assert_eq!(written.organization_count(), 5);
        assert_eq!(
            written.results["o3"].org.fields.get("name"),
            Some(&json!("Org o3"))
        );

        let inserts = store.inserts();
        assert_eq!(inserts.len(), 10);
        assert!(inserts.iter().all(|d| d.collection != "org"));
        assert!(inserts.contains(&StoredDocument {
            database: "o2".into(),
            collection: "contacts".into(),
            document: json!({"payload": [{"email": "ops@o2"}]}),
        }));
        assert!(inserts.contains(&StoredDocument {
            database: "o2".into(),
            collection: "orgInfo".into(),
            document: json!({"id": "o2", "active": true}),
        }));
    }

    /// API failure on the 3rd of 5 organizations: nothing is delivered
    #[tokio::test]
    async fn test_e2e_fault_injection_all_or_nothing() {
        let dir = tempdir().unwrap();
        let blueprint = load_blueprint(dir.path(), "");
        let out = dir.path().join("allvis-results.json");
        let store = MemoryStore::new();
        let mut dispatcher = file_and_store(&out, &store, FailurePolicy::AllOrNothing);
        let client = five_org_client().failing("org/o3/contacts", MockFailure::Transport);

        let mut controller = RunController::new(blueprint);
        let failure = controller
            .run_with(&client, &FixedClock::new("t"), &mut dispatcher)
            .await
            .unwrap_err();

        assert!(matches!(failure, RunFailure::Collection(_)));
        assert!(matches!(controller.state(), RunState::Failed(_)));
        assert!(!out.exists());
        assert!(store.inserts().is_empty());
        assert_eq!(store.probe_count(), 0);
        assert!(client.calls().iter().all(|p| !p.starts_with("org/o4")));
    }

    /// Same fault under BestEffort: the gap is skipped and the run succeeds
    #[tokio::test]
    async fn test_e2e_fault_injection_best_effort() {
        let dir = tempdir().unwrap();
        let blueprint = load_blueprint(dir.path(), "[run]\nfailure_policy = \"best_effort\"\n");
        assert_eq!(blueprint.run.failure_policy, FailurePolicy::BestEffort);
        let out = dir.path().join("allvis-results.json");
        let store = MemoryStore::new().with_failure("o5", "orgInfo");
        let mut dispatcher = file_and_store(&out, &store, FailurePolicy::BestEffort);
        let client = five_org_client().failing("org/o3/contacts", MockFailure::Malformed);

        let mut controller = RunController::new(blueprint);
        let stats = controller
            .run_with(&client, &FixedClock::new("t"), &mut dispatcher)
            .await
            .unwrap();

        assert_eq!(stats.organizations, 5);
        assert_eq!(stats.skipped_fetches, 1);
        assert_eq!(stats.documents_skipped, 1);
        assert!(stats.is_partial());

        let written: ResultDocument =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert!(written.results["o3"].payload("contacts").is_none());
        assert!(written.results["o3"].payload("orgInfo").is_some());
        // 9 fetched payloads, one rejected insert
        assert_eq!(store.inserts().len(), 8);
    }

    /// No sink enabled: configuration failure, zero API calls
    #[tokio::test]
    async fn test_e2e_no_output_configured() {
        let dir = tempdir().unwrap();
        let blueprint = load_blueprint(dir.path(), "");
        assert!(!blueprint.output.any_enabled());

        let mut dispatcher = Dispatcher::from_config(&blueprint.output, FailurePolicy::AllOrNothing)
            .await
            .unwrap();
        let client = five_org_client();

        let mut controller = RunController::new(blueprint);
        let failure = controller
            .run_with(&client, &FixedClock::new("t"), &mut dispatcher)
            .await
            .unwrap_err();

        assert!(matches!(failure, RunFailure::NoOutputConfigured));
        assert!(failure.is_configuration());
        assert_eq!(client.call_count(), 0);
    }

    /// Two runs over identical data differ only in the timestamp
    #[tokio::test]
    async fn test_e2e_runs_differ_only_in_timestamp() {
        let dir = tempdir().unwrap();
        let client = five_org_client();
        let mut documents = Vec::new();

        for (i, stamp) in ["2024-01-01T00:00:00+01:00", "2024-07-01T00:00:00+02:00"]
            .into_iter()
            .enumerate()
        {
            let out = dir.path().join(format!("run-{i}.json"));
            let mut dispatcher = Dispatcher::with_sinks(
                vec![FileSink::new("file", &out).into()],
                FailurePolicy::AllOrNothing,
            );
            let mut controller = RunController::new(load_blueprint(dir.path(), ""));
            controller
                .run_with(&client, &FixedClock::new(stamp), &mut dispatcher)
                .await
                .unwrap();
            let text = std::fs::read_to_string(&out).unwrap();
            documents.push(serde_json::from_str::<ResultDocument>(&text).unwrap());
        }

        assert_ne!(documents[0].time_stamp, documents[1].time_stamp);
        assert_eq!(documents[0].results, documents[1].results);
    }

    /// Concurrency does not change the document
    #[tokio::test]
    async fn test_e2e_concurrent_run_same_document() {
        let dir = tempdir().unwrap();
        let client = five_org_client();
        let mut documents = Vec::new();

        for concurrency in [1, 4] {
            let out = dir.path().join(format!("c{concurrency}.json"));
            let mut dispatcher = Dispatcher::with_sinks(
                vec![FileSink::new("file", &out).into()],
                FailurePolicy::AllOrNothing,
            );
            let blueprint =
                load_blueprint(dir.path(), &format!("[run]\nconcurrency = {concurrency}\n"));
            let mut controller = RunController::new(blueprint);
            controller
                .run_with(&client, &FixedClock::new("t"), &mut dispatcher)
                .await
                .unwrap();
            documents.push(std::fs::read_to_string(&out).unwrap());
        }

        assert_eq!(documents[0], documents[1]);
    }

    #[test]
    fn test_zoned_clock_timestamp_format() {
        let clock = ZonedClock::new("Europe/Oslo").unwrap();
        let stamp = clock.now_iso();

        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
        let offset = parsed.offset().local_minus_utc();
        assert!(offset == 3600 || offset == 7200, "offset {offset} in {stamp}");
        // Microsecond precision like Python's isoformat()
        assert_eq!(stamp.split('.').nth(1).map(|s| s.len()), Some(6 + 6));
    }
}
