//! Document types: stored rows, uploads and supported formats

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// MIME type of plain text uploads
pub const MIME_TEXT: &str = "text/plain";
/// MIME type of PDF uploads
pub const MIME_PDF: &str = "application/pdf";
/// MIME type of Word (.docx) uploads
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Document formats the extractor can read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Plain text file
    Text,
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Anything else, with the MIME type that was declared
    Unsupported(String),
}

impl DocumentKind {
    /// Resolve the kind from a declared MIME type
    ///
    /// Parameters such as `; charset=utf-8` are ignored. A missing or generic
    /// (`application/octet-stream`) type is guessed from the filename instead.
    pub fn detect(declared_mime: Option<&str>, filename: &str) -> Self {
        let declared = declared_mime
            .map(|m| m.split(';').next().unwrap_or("").trim().to_lowercase())
            .filter(|m| !m.is_empty() && m != "application/octet-stream");

        let mime = match declared {
            Some(mime) => mime,
            None => mime_guess::from_path(filename)
                .first_raw()
                .unwrap_or("application/octet-stream")
                .to_string(),
        };

        Self::from_mime(&mime)
    }

    /// Map an exact MIME type to a kind
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            MIME_TEXT => Self::Text,
            MIME_PDF => Self::Pdf,
            MIME_DOCX => Self::Docx,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// Check if this is a supported kind
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Canonical MIME type
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Text => MIME_TEXT,
            Self::Pdf => MIME_PDF,
            Self::Docx => MIME_DOCX,
            Self::Unsupported(mime) => mime.as_str(),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Text => "Text File",
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Unsupported(_) => "Unsupported",
        }
    }
}

/// Which side of the comparison an upload belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    /// Reference document checked for originality
    Pivot,
    /// Document compared against the pivot set
    Target,
    /// Stored without taking part in a comparison
    Archive,
}

impl DocumentRole {
    /// Role for a multipart field name
    pub fn from_field_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "pivot" | "pivots" | "pivot[]" => Self::Pivot,
            "target" | "targets" | "target[]" => Self::Target,
            _ => Self::Archive,
        }
    }
}

/// A file received from the client, not yet extracted
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Comparison side
    pub role: DocumentRole,
    /// Original filename, used as the store key
    pub filename: String,
    /// MIME type declared by the client
    pub mime_type: Option<String>,
    /// Raw bytes
    pub data: Bytes,
}

impl UploadedFile {
    /// Create a new upload
    pub fn new(
        role: DocumentRole,
        filename: impl Into<String>,
        mime_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            role,
            filename: filename.into(),
            mime_type,
            data: data.into(),
        }
    }
}

/// A row of the `files` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredDocument {
    /// Auto-assigned row id
    pub id: i64,
    /// Original filename (unique per row)
    pub filename: String,
    /// Extracted, translated text
    pub content: String,
}

/// A filename and its text, the unit the similarity engine compares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedText {
    pub name: String,
    pub text: String,
}

impl NamedText {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl From<StoredDocument> for NamedText {
    fn from(doc: StoredDocument) -> Self {
        Self {
            name: doc.filename,
            text: doc.content,
        }
    }
}
