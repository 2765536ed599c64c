//! FileSink - writes the document to a JSON file

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{ContractError, DataSink, DeliveryReport, FileOutput, ResultDocument};
use tracing::{error, info, instrument};

/// Sink that writes the document to one file, replacing it on every run
pub struct FileSink {
    name: String,
    path: PathBuf,
    pretty: bool,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            pretty: false,
        }
    }

    /// Create from the `[output.file]` section
    pub fn from_config(name: impl Into<String>, config: &FileOutput) -> Self {
        Self::new(name, &config.path).pretty(config.pretty)
    }

    /// Indent the written JSON
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_document(&self, document: &ResultDocument) -> std::io::Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let bytes = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        }
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&self.path, bytes)?;
        Ok(fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone()))
    }

    fn persist(&self, document: &ResultDocument) -> Result<PathBuf, ContractError> {
        self.write_document(document).map_err(|e| {
            error!(sink = %self.name, path = %self.path.display(), error = %e, "Write failed");
            ContractError::sink_write(&self.name, format!("{}: {e}", self.path.display()))
        })
    }
}

impl DataSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_deliver",
        skip(self, document),
        fields(sink = %self.name, path = %self.path.display())
    )]
    async fn deliver(&mut self, document: &ResultDocument) -> Result<DeliveryReport, ContractError> {
        let written = self.persist(document)?;
        info!(sink = %self.name, path = %written.display(), "Results written to file");
        Ok(DeliveryReport::single())
    }
}
