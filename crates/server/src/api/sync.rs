//! Sync API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use binder_core::{
    SyncError, SyncOutcome, SyncRequest, SyncRun, SyncRunFilter, SyncStatus, SyncType,
};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub outcomes: Vec<SyncOutcome>,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusResponse {
    pub runs: Vec<SyncRun>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunsQuery {
    #[serde(rename = "type", default)]
    pub sync_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RunsResponse {
    pub total: i64,
    pub runs: Vec<SyncRun>,
}

#[derive(Debug, Deserialize)]
pub struct PruneQuery {
    pub older_than_days: u32,
}

#[derive(Debug, Serialize)]
pub struct PruneResponse {
    pub deleted: u32,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_status(error: &SyncError) -> StatusCode {
    match error {
        SyncError::AlreadyRunning(_) => StatusCode::CONFLICT,
        SyncError::MissingLanguage | SyncError::UnknownSet(_) => StatusCode::BAD_REQUEST,
        SyncError::Upstream(_) => StatusCode::BAD_GATEWAY,
        SyncError::Store(_) | SyncError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/sync
///
/// Runs the requested sync to completion and returns per-phase outcomes.
/// Returns 409 when a run of the same type is already in progress. A
/// caller wanting a timeout must wrap the request; an abandoned run is
/// released by the staleness sweep.
pub async fn trigger_sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.runner().run(&request).await {
        Ok(outcomes) => Ok(Json(SyncResponse { outcomes })),
        Err(e) => Err((
            error_status(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// GET /api/v1/sync/status
///
/// Latest run per sync type, straight from the ledger.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SyncStatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.runner().status() {
        Ok(runs) => Ok(Json(SyncStatusResponse { runs })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// GET /api/v1/sync/runs
pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RunsQuery>,
) -> Result<Json<RunsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut filter = SyncRunFilter::new();
    if let Some(sync_type) = params.sync_type.as_deref().and_then(SyncType::parse) {
        filter = filter.with_type(sync_type);
    }
    if let Some(status) = params.status.as_deref().and_then(SyncStatus::parse) {
        filter = filter.with_status(status);
    }
    if let Some(limit) = params.limit {
        filter = filter.with_limit(limit.clamp(1, 500));
    }
    if let Some(offset) = params.offset {
        filter = filter.with_offset(offset.max(0));
    }

    let runs = state.ledger().query(&filter).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;
    let total = state.ledger().count(&filter).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(RunsResponse { total, runs }))
}

/// DELETE /api/v1/sync/runs?older_than_days=N
///
/// Retention cleanup: deletes terminal ledger rows older than the given
/// day count.
pub async fn prune_runs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PruneQuery>,
) -> Result<Json<PruneResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.ledger().prune(params.older_than_days) {
        Ok(deleted) => Ok(Json(PruneResponse { deleted })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
