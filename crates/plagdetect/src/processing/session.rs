//! Comparison sessions: pivot × target scoring over uploaded or stored documents

use crate::error::{Error, Result};
use crate::similarity::{sort_by_score_desc, SimilarityEngine};
use crate::storage::DocumentDb;
use crate::types::{DocumentRole, FileIssue, NamedText, ProcessedDocument, SimilarityResult, UploadedFile};

use super::pipeline::IngestPipeline;

/// Everything a comparison request produced
#[derive(Debug, Default)]
pub struct ComparisonOutcome {
    /// Rows sorted by descending similarity
    pub results: Vec<SimilarityResult>,
    pub pivot_count: usize,
    pub target_count: usize,
    /// Documents stored while handling the request
    pub documents: Vec<ProcessedDocument>,
    /// Files that were skipped
    pub issues: Vec<FileIssue>,
}

/// Scores pivot documents against target documents
#[derive(Clone)]
pub struct ComparisonSession {
    pipeline: IngestPipeline,
    engine: SimilarityEngine,
}

impl ComparisonSession {
    pub fn new(pipeline: IngestPipeline, engine: SimilarityEngine) -> Self {
        Self { pipeline, engine }
    }

    /// Pipeline used for uploads
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.pipeline
    }

    /// Store every upload, then compare the pivot uploads with the target uploads
    ///
    /// Uploads are stored even when the comparison itself cannot run.
    pub async fn compare_uploads(&self, files: Vec<UploadedFile>) -> Result<ComparisonOutcome> {
        let report = self.pipeline.process(files).await?;

        let pivots: Vec<NamedText> = report
            .documents_with_role(DocumentRole::Pivot)
            .map(|d| NamedText::new(d.filename.clone(), d.content.clone()))
            .collect();
        let targets: Vec<NamedText> = report
            .documents_with_role(DocumentRole::Target)
            .map(|d| NamedText::new(d.filename.clone(), d.content.clone()))
            .collect();

        if let Err(e) = ensure_not_empty(&pivots, &targets) {
            for issue in &report.issues {
                tracing::warn!("Skipped {:?} file '{}': {}", issue.role, issue.filename, issue.message);
            }
            return Err(e);
        }

        let results = self.compare(&pivots, &targets)?;
        Ok(ComparisonOutcome {
            results,
            pivot_count: pivots.len(),
            target_count: targets.len(),
            documents: report.documents,
            issues: report.issues,
        })
    }

    /// Compare documents already in the store, selected by id
    pub fn compare_stored(
        &self,
        store: &DocumentDb,
        pivot_ids: &[i64],
        target_ids: &[i64],
    ) -> Result<ComparisonOutcome> {
        let load = |ids: &[i64]| -> Result<Vec<NamedText>> {
            ids.iter()
                .map(|&id| {
                    store
                        .get_by_id(id)?
                        .map(NamedText::from)
                        .ok_or(Error::DocumentNotFound(id))
                })
                .collect()
        };

        let pivots = load(pivot_ids)?;
        let targets = load(target_ids)?;
        let results = self.compare(&pivots, &targets)?;

        Ok(ComparisonOutcome {
            results,
            pivot_count: pivots.len(),
            target_count: targets.len(),
            ..ComparisonOutcome::default()
        })
    }

    /// Full cross product sorted by descending similarity
    pub fn compare(&self, pivots: &[NamedText], targets: &[NamedText]) -> Result<Vec<SimilarityResult>> {
        ensure_not_empty(pivots, targets)?;

        let mut results = self.engine.pairwise_similarity(pivots, targets);
        sort_by_score_desc(&mut results);

        tracing::info!(
            "Compared {} pivot(s) with {} target(s)",
            pivots.len(),
            targets.len()
        );
        Ok(results)
    }
}

fn ensure_not_empty(pivots: &[NamedText], targets: &[NamedText]) -> Result<()> {
    match (pivots.is_empty(), targets.is_empty()) {
        (true, true) => Err(Error::EmptyInput(
            "no pivot and no target documents were provided".to_string(),
        )),
        (true, false) => Err(Error::EmptyInput("no pivot documents were provided".to_string())),
        (false, true) => Err(Error::EmptyInput("no target documents were provided".to_string())),
        (false, false) => Ok(()),
    }
}
