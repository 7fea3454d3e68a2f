//! Applies an [`Executor`] to one document or a batch of documents.
//!
//! In a batch, a document whose transformation fails is dropped and logged
//! rather than aborting the run, unless `continue_on_error` is switched off.

use log::{debug, info, warn};
use serde_json::Value as Json;

use crate::executor::{Executor, TransformError};

/// Batch settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Drop failing documents instead of returning the first failure
    pub continue_on_error: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            continue_on_error: true,
        }
    }
}

/// Counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub read: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Loaded input: one document, or a batch of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Single(Json),
    Batch(Vec<Json>),
}

/// Transformed output, shaped like the input it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Single(Json),
    Batch(Vec<Json>),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    executor: Executor,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(executor: Executor, config: PipelineConfig) -> Self {
        Pipeline { executor, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transforms a single document, propagating any failure.
    pub fn transform(&self, document: Json) -> Result<Json, TransformError> {
        self.executor.execute(document)
    }

    /// Transforms a batch, preserving the order of surviving documents.
    pub fn transform_all<I>(&self, documents: I) -> Result<Vec<Json>, TransformError>
    where
        I: IntoIterator<Item = Json>,
    {
        self.transform_all_with_report(documents)
            .map(|(results, _)| results)
    }

    /// Like [`transform_all`](Self::transform_all), also returning the counts.
    pub fn transform_all_with_report<I>(
        &self,
        documents: I,
    ) -> Result<(Vec<Json>, BatchReport), TransformError>
    where
        I: IntoIterator<Item = Json>,
    {
        let mut results = Vec::new();
        let mut report = BatchReport::default();

        for (position, document) in documents.into_iter().enumerate() {
            report.read += 1;
            debug!("transforming document {}", position);
            match self.executor.execute(document) {
                Ok(output) => {
                    results.push(output);
                    report.written += 1;
                }
                Err(e) if self.config.continue_on_error => {
                    warn!("dropping document {}: {}", position, e);
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("document {} failed, stopping batch: {}", position, e);
                    return Err(e);
                }
            }
        }

        info!(
            "batch finished: read={}, written={}, skipped={}",
            report.read, report.written, report.skipped
        );
        Ok((results, report))
    }

    pub fn run(&self, input: Input) -> Result<Output, TransformError> {
        match input {
            Input::Single(document) => self.transform(document).map(Output::Single),
            Input::Batch(documents) => self.transform_all(documents).map(Output::Batch),
        }
    }
}
