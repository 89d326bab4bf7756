//! API routes for the similarity server

pub mod compare;
pub mod documents;

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    routing::{get, post},
    Json, Router,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{DocumentRole, UploadedFile};

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Comparison - with larger body limit for file uploads
        .route(
            "/compare",
            post(compare::compare_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/compare/stored", post(compare::compare_stored))
        // Document browser
        .route(
            "/documents",
            get(documents::list_documents)
                .post(documents::upload_documents)
                .delete(documents::clear_documents)
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route(
            "/documents/:id",
            get(documents::get_document).delete(documents::delete_document),
        )
        // Info
        .route("/about", get(about))
        .route("/info", get(info))
}

/// Read every file part of a multipart body, in the order received
///
/// The field name selects the comparison side (`pivot`, `target`, anything
/// else is stored only). Parts without a filename are not files and are
/// ignored.
pub(crate) async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            tracing::debug!("Ignoring non-file field '{}'", name);
            continue;
        };
        if filename.trim().is_empty() {
            continue;
        }
        let mime_type = field.content_type().map(|s| s.to_string());

        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read file '{}': {}", filename, e);
            Error::from(e)
        })?;

        let role = DocumentRole::from_field_name(&name);
        tracing::debug!("Received {:?} file '{}' ({} bytes)", role, filename, data.len());
        files.push(UploadedFile::new(role, filename, mime_type, data));
    }

    Ok(files)
}

/// GET / - welcome and menu
pub async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "PlagDetect",
        "message": "Welcome to PlagDetect. Pick an option from the menu to get started.",
        "menu": [
            { "view": "Compare", "endpoint": "POST /api/compare" },
            { "view": "Browse", "endpoint": "GET /api/documents" },
            { "view": "About", "endpoint": "GET /api/about" }
        ]
    }))
}

/// GET /api/about
async fn about() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "PlagDetect",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Detects plagiarism between documents by analysing their content and reporting how similar they are.",
        "features": {
            "comparison": "Scores how much one document draws on another as a similarity percentage",
            "batch_analysis": "Compares every pivot document with every target document",
            "formats": "Plain text (.txt), PDF (.pdf) and Word (.docx)",
            "cross_language": "Documents are translated to a common language before comparison"
        }
    }))
}

/// GET /api/info - endpoint listing
async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "plagdetect",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document similarity service with translation to a common language",
        "endpoints": {
            "POST /api/compare": "Upload pivot and target files (multipart) and compare them",
            "POST /api/compare/stored": "Compare stored documents by id",
            "POST /api/documents": "Upload and store files without comparing",
            "GET /api/documents": "List all stored documents",
            "GET /api/documents/:id": "Get a stored document",
            "DELETE /api/documents/:id": "Delete a stored document",
            "DELETE /api/documents": "Delete every stored document (requires {\"confirm\": true})",
            "GET /api/about": "About PlagDetect"
        }
    }))
}
