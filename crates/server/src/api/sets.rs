//! Set browsing and catalog maintenance handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use binder_core::{CardSet, CatalogStats, StoreError};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SetsResponse {
    pub count: usize,
    pub sets: Vec<CardSet>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /api/v1/sets
pub async fn list_sets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SetsResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().list_sets() {
        Ok(sets) => Ok(Json(SetsResponse {
            count: sets.len(),
            sets,
        })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// GET /api/v1/sets/{code}
pub async fn get_set(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<CardSet>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().get_set(&code) {
        Ok(set) => Ok(Json(set)),
        Err(StoreError::NotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Set not found: {}", code),
            }),
        )),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// GET /api/v1/catalog/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CatalogStats>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().stats() {
        Ok(stats) => Ok(Json(stats)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}

/// DELETE /api/v1/catalog
///
/// Destructive reset: drops every set and card. Sync rebuilds from
/// upstream.
pub async fn clear_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.store().clear() {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )),
    }
}
