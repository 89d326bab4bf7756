//! Error types for the similarity service

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for plagdetect operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Plain-text file unreadable in every supported encoding
    #[error("Unable to decode file '{filename}': {message}")]
    Decoding { filename: String, message: String },

    /// Declared MIME type is not one of the supported document kinds
    #[error("Unsupported file format for '{filename}': {mime_type}")]
    UnsupportedFormat { filename: String, mime_type: String },

    /// File parsing error (corrupt PDF, broken DOCX container)
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Translation service error
    #[error("Translation failed: {0}")]
    Translation(String),

    /// Comparison requested without pivot or target texts
    #[error("Nothing to compare: {0}")]
    EmptyInput(String),

    /// Document store error
    #[error("Document store error: {0}")]
    Store(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(i64),

    /// Destructive action requested without explicit confirmation
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    /// Malformed or oversized multipart upload
    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a decoding error
    pub fn decoding(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decoding {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a translation error
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Short machine-readable kind, used in JSON bodies and upload reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config_error",
            Error::Decoding { .. } => "decoding_error",
            Error::UnsupportedFormat { .. } => "unsupported_format",
            Error::FileParse { .. } => "parse_error",
            Error::Translation(_) => "translation_error",
            Error::EmptyInput(_) => "empty_input",
            Error::Store(_) => "store_error",
            Error::DocumentNotFound(_) => "not_found",
            Error::ConfirmationRequired(_) => "confirmation_required",
            Error::Upload(_) => "upload_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Whether this error only concerns a single uploaded file
    ///
    /// File-scoped errors are reported and the file is skipped; the rest of the
    /// batch keeps going.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            Error::Decoding { .. } | Error::UnsupportedFormat { .. } | Error::FileParse { .. }
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Config(_) => StatusCode::BAD_REQUEST,
            Error::Decoding { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::FileParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Translation(_) => StatusCode::BAD_GATEWAY,
            Error::EmptyInput(_) => StatusCode::BAD_REQUEST,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            Error::ConfirmationRequired(_) => StatusCode::BAD_REQUEST,
            Error::Upload(e) => e.status(),
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_scoped_errors() {
        assert!(Error::decoding("a.txt", "binary").is_file_scoped());
        assert!(Error::file_parse("a.pdf", "broken").is_file_scoped());
        assert!(!Error::translation("down").is_file_scoped());
        assert!(!Error::EmptyInput("no targets".to_string()).is_file_scoped());
    }

    #[test]
    fn test_status_mapping() {
        let response = Error::DocumentNotFound(7).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = Error::EmptyInput("no targets".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = Error::UnsupportedFormat {
            filename: "photo.png".to_string(),
            mime_type: "image/png".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
