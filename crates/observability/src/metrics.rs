//! Harvest metrics
//!
//! Thin wrappers over the `metrics` macros so metric names and labels stay in
//! one place. Without an installed recorder every call is a no-op.

use metrics::{counter, gauge, histogram};

/// Record one API request
pub fn record_api_request(success: bool) {
    counter!(
        "allvis_harvest_api_requests_total",
        "status" => status(success)
    )
    .increment(1);
}

/// Record an organization whose endpoints were all attempted
pub fn record_organization_collected() {
    counter!("allvis_harvest_organizations_collected_total").increment(1);
}

/// Record an endpoint fetch left out of the document
pub fn record_fetch_skipped(endpoint: &str) {
    counter!(
        "allvis_harvest_fetches_skipped_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
}

/// Record one sink delivery attempt
pub fn record_sink_delivery(sink_name: &str, success: bool) {
    counter!(
        "allvis_harvest_sink_deliveries_total",
        "sink" => sink_name.to_string(),
        "status" => status(success)
    )
    .increment(1);
}

/// Record documents a sink wrote in one delivery
pub fn record_documents_written(sink_name: &str, count: usize) {
    counter!(
        "allvis_harvest_documents_written_total",
        "sink" => sink_name.to_string()
    )
    .increment(count as u64);
}

/// Record the end of a run
///
/// `outcome` is a short label such as "succeeded" or "no_output_configured".
pub fn record_run(outcome: &str, duration_secs: f64) {
    counter!(
        "allvis_harvest_runs_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!("allvis_harvest_run_duration_seconds").record(duration_secs);
    gauge!("allvis_harvest_last_run_duration_seconds").set(duration_secs);
}

fn status(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
