//! plagdetect: cross-language document similarity service
//!
//! Uploaded pivot and target documents (plain text, PDF, Word) are reduced to
//! text, translated to a common language, stored in SQLite keyed by filename,
//! and compared pairwise with bag-of-words cosine similarity reported as a
//! percentage.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod server;
pub mod similarity;
pub mod storage;
pub mod translation;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use similarity::{pairwise_similarity, similarity_percent};
pub use types::{
    document::{DocumentKind, DocumentRole, StoredDocument, UploadedFile},
    response::{CompareResponse, SimilarityResult},
};
