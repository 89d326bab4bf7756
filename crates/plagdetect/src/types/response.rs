//! Response types for uploads, comparisons and the document browser

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::{DocumentKind, DocumentRole, StoredDocument};

/// Similarity between one pivot and one target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityResult {
    /// Pivot filename
    pub pivot_filename: String,
    /// Target filename
    pub target_filename: String,
    /// Similarity percentage (0.0-100.0)
    pub similarity: f64,
}

/// A document that made it through extract, translate and persist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDocument {
    /// Row id in the store
    pub id: i64,
    /// Original filename
    pub filename: String,
    /// Comparison side
    pub role: DocumentRole,
    /// Detected format
    pub kind: DocumentKind,
    /// Whether the upload replaced an existing row with the same filename
    pub replaced: bool,
    /// SHA-256 of the extracted text (before translation)
    pub content_hash: String,
    /// Characters stored after translation
    pub char_count: usize,
    /// Number of pages (PDF only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Stored text
    #[serde(skip)]
    pub content: String,
}

/// A file that was skipped, and why
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileIssue {
    /// Original filename
    pub filename: String,
    /// Comparison side
    pub role: DocumentRole,
    /// Machine-readable kind (decoding_error, unsupported_format, ...)
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

/// Response for an upload without comparison
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Whether at least one file was stored
    pub success: bool,
    /// Stored documents
    pub documents: Vec<DocumentSummary>,
    /// Skipped files
    pub issues: Vec<FileIssue>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Response for a comparison request
#[derive(Debug, Serialize, Deserialize)]
pub struct CompareResponse {
    /// Rows sorted by descending similarity
    pub results: Vec<SimilarityResult>,
    /// Number of pivot documents compared
    pub pivot_count: usize,
    /// Number of target documents compared
    pub target_count: usize,
    /// Documents stored while handling this request
    #[serde(default)]
    pub documents: Vec<DocumentSummary>,
    /// Skipped files
    #[serde(default)]
    pub issues: Vec<FileIssue>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// When the comparison was computed
    pub generated_at: DateTime<Utc>,
}

/// Per-document line of an upload report, without the content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub filename: String,
    pub role: DocumentRole,
    pub kind: DocumentKind,
    pub replaced: bool,
    pub char_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl From<&ProcessedDocument> for DocumentSummary {
    fn from(doc: &ProcessedDocument) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            role: doc.role,
            kind: doc.kind.clone(),
            replaced: doc.replaced,
            char_count: doc.char_count,
            page_count: doc.page_count,
        }
    }
}

/// Full dump of the document table
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<StoredDocument>,
    pub total_count: usize,
}

/// Result of deleting one document
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: i64,
    /// False when no row had this id
    pub deleted: bool,
}

/// Result of the bulk clear action
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
}
