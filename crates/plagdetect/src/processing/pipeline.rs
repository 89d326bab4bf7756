//! Extract → translate → persist pipeline for uploaded files

use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::{AppConfig, TranslationFailurePolicy};
use crate::error::{Error, Result};
use crate::ingestion::{ExtractedText, TextExtractor};
use crate::storage::DocumentDb;
use crate::translation::Translator;
use crate::types::{DocumentRole, FileIssue, ProcessedDocument, UploadedFile};

/// Documents stored and files skipped by one pipeline run, in upload order
#[derive(Debug, Default)]
pub struct IngestReport {
    pub documents: Vec<ProcessedDocument>,
    pub issues: Vec<FileIssue>,
}

impl IngestReport {
    /// Stored documents on one side of the comparison
    pub fn documents_with_role(&self, role: DocumentRole) -> impl Iterator<Item = &ProcessedDocument> {
        self.documents.iter().filter(move |d| d.role == role)
    }
}

/// What happened to a single file
enum FileOutcome {
    Stored(ProcessedDocument),
    Skipped(FileIssue),
}

/// Runs uploaded files through extraction, translation and the store
#[derive(Clone)]
pub struct IngestPipeline {
    store: DocumentDb,
    translator: Arc<dyn Translator>,
    target_language: String,
    failure_policy: TranslationFailurePolicy,
    max_concurrent: usize,
}

impl IngestPipeline {
    pub fn new(config: &AppConfig, store: DocumentDb, translator: Arc<dyn Translator>) -> Self {
        Self {
            store,
            translator,
            target_language: config.translation.target_language.clone(),
            failure_policy: config.comparison.translation_failure,
            max_concurrent: config.comparison.max_concurrent_translations.max(1),
        }
    }

    /// Process every file
    ///
    /// At most `max_concurrent` files are in flight; with the default of one,
    /// each file is fully stored before the next is extracted. Files sharing a
    /// filename are handled one after another in upload order, so the last
    /// upload of a name is the one left in the store. Files that cannot be
    /// decoded, parsed, stored or (under the skip policy) translated are
    /// reported as issues. Under the abort policy a translation failure fails
    /// the whole run; files stored before it stay stored.
    pub async fn process(&self, files: Vec<UploadedFile>) -> Result<IngestReport> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        tracing::info!(
            "Processing {} uploaded file(s) via {} ({} at a time)",
            files.len(),
            self.translator.name(),
            self.max_concurrent
        );

        let group_futures = group_by_filename(files).into_iter().map(|group| {
            let sem = semaphore.clone();
            async move {
                let mut outcomes = Vec::with_capacity(group.len());
                for (position, file) in group {
                    let _permit = sem
                        .acquire()
                        .await
                        .map_err(|e| Error::internal(format!("Semaphore closed: {}", e)))?;
                    outcomes.push((position, self.process_file(file).await?));
                }
                Ok::<_, Error>(outcomes)
            }
        });

        let mut outcomes: Vec<(usize, FileOutcome)> =
            try_join_all(group_futures).await?.into_iter().flatten().collect();
        outcomes.sort_by_key(|(position, _)| *position);

        let mut report = IngestReport::default();
        for (_, outcome) in outcomes {
            match outcome {
                FileOutcome::Stored(doc) => report.documents.push(doc),
                FileOutcome::Skipped(issue) => report.issues.push(issue),
            }
        }

        tracing::info!(
            "Stored {} document(s), skipped {} file(s)",
            report.documents.len(),
            report.issues.len()
        );
        Ok(report)
    }

    async fn process_file(&self, file: UploadedFile) -> Result<FileOutcome> {
        let UploadedFile {
            role,
            filename,
            mime_type,
            data,
        } = file;

        tracing::info!("Processing {:?} file: {} ({} bytes)", role, filename, data.len());

        let extracted = {
            let filename = filename.clone();
            tokio::task::spawn_blocking(move || {
                TextExtractor::extract(&data, mime_type.as_deref(), &filename)
            })
            .await
            .map_err(|e| Error::internal(format!("Extraction task failed: {}", e)))?
        };

        let extracted: ExtractedText = match extracted {
            Ok(extracted) => extracted,
            Err(e) if e.is_file_scoped() => {
                tracing::warn!("Skipping '{}': {}", filename, e);
                return Ok(FileOutcome::Skipped(issue(&filename, role, &e)));
            }
            Err(e) => return Err(e),
        };

        let content = match self
            .translator
            .translate(&extracted.content, &self.target_language)
            .await
        {
            Ok(content) => content,
            Err(e) => match self.failure_policy {
                TranslationFailurePolicy::Skip => {
                    tracing::warn!("Skipping '{}', translation failed: {}", filename, e);
                    return Ok(FileOutcome::Skipped(issue(&filename, role, &e)));
                }
                TranslationFailurePolicy::Abort => {
                    tracing::error!("Aborting batch, translation of '{}' failed: {}", filename, e);
                    return Err(Error::translation(format!("'{}': {}", filename, e)));
                }
            },
        };

        let outcome = match self.store.upsert(&filename, &content) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Failed to store '{}': {}", filename, e);
                return Ok(FileOutcome::Skipped(issue(&filename, role, &e)));
            }
        };

        Ok(FileOutcome::Stored(ProcessedDocument {
            id: outcome.id(),
            filename,
            role,
            kind: extracted.kind,
            replaced: outcome.replaced(),
            content_hash: extracted.content_hash,
            char_count: content.chars().count(),
            page_count: extracted.page_count,
            content,
        }))
    }
}

/// Uploads grouped by filename, groups ordered by first appearance
///
/// Each upload keeps its position in the batch.
fn group_by_filename(files: Vec<UploadedFile>) -> Vec<Vec<(usize, UploadedFile)>> {
    let mut groups: Vec<Vec<(usize, UploadedFile)>> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for (position, file) in files.into_iter().enumerate() {
        match by_name.get(&file.filename) {
            Some(&group) => groups[group].push((position, file)),
            None => {
                by_name.insert(file.filename.clone(), groups.len());
                groups.push(vec![(position, file)]);
            }
        }
    }

    groups
}

fn issue(filename: &str, role: DocumentRole, error: &Error) -> FileIssue {
    FileIssue {
        filename: filename.to_string(),
        role,
        kind: error.kind().to_string(),
        message: error.to_string(),
    }
}
