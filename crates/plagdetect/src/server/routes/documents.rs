//! Document browser and upload endpoints

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{
    ClearResponse, DeleteResponse, DocumentListResponse, DocumentSummary, StoredDocument,
    UploadResponse,
};

use super::read_uploads;

/// Request body for the bulk clear
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ClearRequest {
    /// Must be true for anything to be deleted
    #[serde(default)]
    pub confirm: bool,
}

/// GET /api/documents - full dump of the document table
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<DocumentListResponse>> {
    let documents = state.store().list_all()?;

    Ok(Json(DocumentListResponse {
        total_count: documents.len(),
        documents,
    }))
}

/// GET /api/documents/:id - one document with its full content
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StoredDocument>> {
    state
        .store()
        .get_by_id(id)?
        .map(Json)
        .ok_or(Error::DocumentNotFound(id))
}

/// DELETE /api/documents/:id - remove one document
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.store().delete_by_id(id)?;

    if deleted {
        tracing::info!("Deleted document {}", id);
    } else {
        tracing::debug!("Delete requested for missing document {}", id);
    }

    Ok(Json(DeleteResponse { id, deleted }))
}

/// DELETE /api/documents - remove every document, with explicit confirmation
pub async fn clear_documents(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ClearResponse>> {
    let request: ClearRequest = if body.is_empty() {
        ClearRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    if !request.confirm {
        return Err(Error::ConfirmationRequired(
            "send {\"confirm\": true} to delete every stored document".to_string(),
        ));
    }

    let success = state.store().clear_all();
    let message = if success {
        "All documents have been deleted".to_string()
    } else {
        "Failed to clear the document store".to_string()
    };

    Ok(Json(ClearResponse { success, message }))
}

/// POST /api/documents - extract, translate and store files without comparing
pub async fn upload_documents(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let files = read_uploads(multipart).await?;

    let report = state.session().pipeline().process(files).await?;

    Ok(Json(UploadResponse {
        success: !report.documents.is_empty(),
        documents: report.documents.iter().map(DocumentSummary::from).collect(),
        issues: report.issues,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

#[cfg(test)]
mod tests {
    use crate::server::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_list_and_get() {
        let (app, state) = test_app();
        let id = state.store().upsert("a.txt", "alpha").unwrap().id();
        state.store().upsert("b.txt", "beta").unwrap();

        let (status, body) = send(&app, empty_request(Method::GET, "/api/documents")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 2);
        assert_eq!(body["documents"][0]["filename"], "a.txt");
        assert_eq!(body["documents"][0]["content"], "alpha");

        let uri = format!("/api/documents/{}", id);
        let (status, body) = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "alpha");

        let (status, body) = send(&app, empty_request(Method::GET, "/api/documents/4242")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found");
    }

    #[tokio::test]
    async fn test_delete_document() {
        let (app, state) = test_app();
        let id = state.store().upsert("a.txt", "alpha").unwrap().id();

        let uri = format!("/api/documents/{}", id);
        let (status, body) = send(&app, empty_request(Method::DELETE, &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);

        // deleting again is a no-op, not an error
        let (status, body) = send(&app, empty_request(Method::DELETE, &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], false);
        assert_eq!(state.store().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let (app, state) = test_app();
        state.store().upsert("a.txt", "alpha").unwrap();

        let (status, body) = send(&app, empty_request(Method::DELETE, "/api/documents")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "confirmation_required");

        let request = json_request(Method::DELETE, "/api/documents", json!({ "confirm": false }));
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.store().count().unwrap(), 1);

        let request = json_request(Method::DELETE, "/api/documents", json!({ "confirm": true }));
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(state.store().count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upload_without_compare() {
        let (app, state) = test_app();
        let body = multipart_body(&[
            ("file", "notes.txt", "text/plain", b"le chat"),
            ("file", "blob.txt", "text/plain", b"\xff\xfe\x00\x01"),
        ]);

        let (status, body) = send(&app, multipart_request("/api/documents", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["documents"][0]["filename"], "notes.txt");
        assert_eq!(body["issues"][0]["kind"], "decoding_error");

        let stored = state.store().get_by_filename("notes.txt").unwrap().unwrap();
        assert_eq!(stored.content, "the cat");
    }
}
