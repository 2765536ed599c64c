//! Run statistics.

use std::time::Duration;

use collector::CollectionOutcome;
use dispatcher::DispatchReport;

/// Statistics from a harvest run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Organizations in the document
    pub organizations: usize,

    /// Endpoint payloads in the document
    pub endpoint_fetches: usize,

    /// Endpoint fetches left out (BestEffort only)
    pub skipped_fetches: usize,

    /// Sinks that accepted the document
    pub sinks_delivered: usize,

    /// Documents written across all sinks
    pub documents_written: usize,

    /// Inserts skipped inside successful deliveries (BestEffort only)
    pub documents_skipped: usize,

    /// Timestamp of the collected document
    pub time_stamp: String,

    /// Total duration of the run
    pub duration: Duration,
}

impl RunStats {
    pub fn from_run(
        outcome: &CollectionOutcome,
        report: &DispatchReport,
        duration: Duration,
    ) -> Self {
        Self {
            organizations: outcome.document.organization_count(),
            endpoint_fetches: outcome.fetched(),
            skipped_fetches: outcome.skipped.len(),
            sinks_delivered: report.delivered.len(),
            documents_written: report.documents_written(),
            documents_skipped: report.documents_skipped(),
            time_stamp: outcome.document.time_stamp.clone(),
            duration,
        }
    }

    /// Anything was left out under BestEffort
    pub fn is_partial(&self) -> bool {
        self.skipped_fetches > 0 || self.documents_skipped > 0
    }

    /// Print detailed summary (stderr, stdout belongs to the console sink)
    pub fn print_summary(&self) {
        eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
        eprintln!("║                      Harvest Statistics                      ║");
        eprintln!("╚══════════════════════════════════════════════════════════════╝\n");

        eprintln!("📊 Overview");
        eprintln!("   ├─ Timestamp: {}", self.time_stamp);
        eprintln!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        eprintln!("   ├─ Organizations: {}", self.organizations);
        eprintln!("   └─ Endpoint fetches: {}", self.endpoint_fetches);

        eprintln!("\n📤 Delivery");
        eprintln!("   ├─ Sinks delivered: {}", self.sinks_delivered);
        eprintln!("   └─ Documents written: {}", self.documents_written);

        if self.is_partial() {
            eprintln!("\n⚠️  Skipped");
            eprintln!("   ├─ Endpoint fetches: {}", self.skipped_fetches);
            eprintln!("   └─ Store inserts: {}", self.documents_skipped);
        }

        eprintln!();
    }
}
