//! ConsoleSink - pretty prints the document to stdout

use std::io::Write;

use contracts::{ContractError, DataSink, DeliveryReport, ResultDocument};
use tracing::{info, instrument};

/// Sink that prints the whole document as indented JSON
pub struct ConsoleSink {
    name: String,
}

impl ConsoleSink {
    /// Create a new ConsoleSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Text printed for `document`
    pub fn render(document: &ResultDocument) -> Result<String, ContractError> {
        Ok(serde_json::to_string_pretty(document)?)
    }
}

impl DataSink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "console_sink_deliver",
        skip(self, document),
        fields(sink = %self.name, organizations = document.organization_count())
    )]
    async fn deliver(&mut self, document: &ResultDocument) -> Result<DeliveryReport, ContractError> {
        let text = Self::render(document)?;

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")
            .and_then(|_| stdout.flush())
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;

        info!(sink = %self.name, "Results printed to console");
        Ok(DeliveryReport::single())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OrgResultBundle, Organization};
    use serde_json::json;

    #[test]
    fn test_render_is_indented_json() {
        let mut document = ResultDocument::new("2024-05-01T10:00:00+02:00");
        let mut bundle = OrgResultBundle::new(Organization::new("org1"));
        bundle.set_payload("nets", json!({"count": 0}));
        document.insert_bundle(bundle);

        let text = ConsoleSink::render(&document).unwrap();
        assert!(text.contains('\n'));
        assert!(text.contains("  \"timeStamp\""));

        let parsed: ResultDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, document);
    }

    #[tokio::test]
    async fn test_console_sink_deliver() {
        let mut sink = ConsoleSink::new("console");
        let report = sink.deliver(&ResultDocument::new("t")).await.unwrap();
        assert_eq!(report, DeliveryReport::single());
        assert_eq!(sink.name(), "console");
    }
}
