//! Core types for documents, uploads and comparison results

pub mod document;
pub mod response;

pub use document::{DocumentKind, DocumentRole, NamedText, StoredDocument, UploadedFile};
pub use response::{
    ClearResponse, CompareResponse, DeleteResponse, DocumentListResponse, DocumentSummary,
    FileIssue, ProcessedDocument, SimilarityResult, UploadResponse,
};
