//! Processing orchestration for one source at a time

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::generation::QueryEngine;
use crate::ingestion::{FileParser, WebExtractor};
use crate::providers::ModelClient;
use crate::storage::ResultWriter;
use crate::types::{AnswerRecord, ResultDocument, Source, QUESTIONS};

/// What happened to a single source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Answers were written to this path
    Saved(PathBuf),
    /// Nothing was written (no text extracted)
    Skipped(String),
    /// Extraction or persistence failed; the batch carries on
    Failed(String),
}

/// Totals for a batch of sources
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Files written, in processing order
    pub saved: Vec<PathBuf>,
    /// Sources with no extractable text
    pub skipped: usize,
    /// Sources that failed
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: ProcessOutcome) {
        match outcome {
            ProcessOutcome::Saved(path) => self.saved.push(path),
            ProcessOutcome::Skipped(_) => self.skipped += 1,
            ProcessOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.saved.len() + self.skipped + self.failed
    }
}

/// Drives extraction, questioning and persistence for each source
pub struct Processor {
    web: WebExtractor,
    engine: QueryEngine,
    writer: ResultWriter,
}

impl Processor {
    pub fn new(web: WebExtractor, engine: QueryEngine, writer: ResultWriter) -> Self {
        Self { web, engine, writer }
    }

    /// Build a processor from configuration around an existing model client.
    ///
    /// Creates the output folder.
    pub fn from_config(config: &AppConfig, client: Arc<dyn ModelClient>) -> Result<Self> {
        Ok(Self::new(
            WebExtractor::new(&config.fetch)?,
            QueryEngine::new(client, config.model.timeout()),
            ResultWriter::create(&config.output_dir)?,
        ))
    }

    pub fn writer(&self) -> &ResultWriter {
        &self.writer
    }

    /// Extract the plain text of a source.
    ///
    /// File errors propagate; web failures come back as empty text.
    pub async fn extract(&self, source: &Source) -> Result<String> {
        match source {
            Source::File(path) => {
                let path = path.clone();
                let parsed = tokio::task::spawn_blocking(move || FileParser::parse_path(&path))
                    .await
                    .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;
                Ok(parsed.text())
            }
            Source::Url(url) => Ok(self.web.extract(url).await),
        }
    }

    /// Process one source; failures are logged and reported, never raised
    pub async fn process(&self, source: &Source) -> ProcessOutcome {
        match source {
            Source::File(_) => tracing::info!("Processing file: {}", source.identifier()),
            Source::Url(_) => tracing::info!("Processing URL: {}", source),
        }

        match self.try_process(source).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Error processing {}: {}", source.identifier(), e);
                ProcessOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_process(&self, source: &Source) -> Result<ProcessOutcome> {
        let text = self.extract(source).await?;

        if text.trim().is_empty() {
            tracing::warn!("No text extracted from {}", source.identifier());
            return Ok(ProcessOutcome::Skipped("no text extracted".to_string()));
        }

        tracing::info!("Extracted {} characters", text.chars().count());

        let mut qa = AnswerRecord::new();
        for question in QUESTIONS {
            tracing::info!("Asking: {}", question);
            let answer = self.engine.ask(question, &text).await;
            qa.insert(question, answer);
        }

        let document = ResultDocument::new(source.identifier(), qa);
        let path = self.writer.save(&document, &source.output_key())?;

        tracing::info!("Saved results to {}", path.display());
        Ok(ProcessOutcome::Saved(path))
    }

    /// Process sources strictly one after another
    pub async fn process_all(&self, sources: &[Source]) -> RunSummary {
        let mut summary = RunSummary::default();
        for source in sources {
            summary.record(self.process(source).await);
        }
        summary
    }
}
