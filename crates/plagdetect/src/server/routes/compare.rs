//! Comparison endpoints

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::Result;
use crate::processing::ComparisonOutcome;
use crate::server::state::AppState;
use crate::types::{CompareResponse, DocumentSummary};

use super::read_uploads;

/// Request body for comparing stored documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCompareRequest {
    /// Ids of the pivot documents
    pub pivot_ids: Vec<i64>,
    /// Ids of the target documents
    pub target_ids: Vec<i64>,
}

/// POST /api/compare - upload pivot and target files and compare them
pub async fn compare_files(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CompareResponse>> {
    let start = Instant::now();
    let files = read_uploads(multipart).await?;

    let outcome = state.session().compare_uploads(files).await?;

    Ok(Json(into_response(outcome, start)))
}

/// POST /api/compare/stored - compare documents already in the store
pub async fn compare_stored(
    State(state): State<AppState>,
    Json(request): Json<StoredCompareRequest>,
) -> Result<Json<CompareResponse>> {
    let start = Instant::now();

    let outcome = state
        .session()
        .compare_stored(state.store(), &request.pivot_ids, &request.target_ids)?;

    Ok(Json(into_response(outcome, start)))
}

fn into_response(outcome: ComparisonOutcome, start: Instant) -> CompareResponse {
    CompareResponse {
        documents: outcome.documents.iter().map(DocumentSummary::from).collect(),
        results: outcome.results,
        pivot_count: outcome.pivot_count,
        target_count: outcome.target_count,
        issues: outcome.issues,
        processing_time_ms: start.elapsed().as_millis() as u64,
        generated_at: chrono::Utc::now(),
    }
}
