//! Card search API handlers.
//!
//! Query parameters arrive string-typed and are coerced here: the color
//! list is comma-separated, upper-cased and filtered to the valid letter
//! set; boolean-ish strings are coerced and anything else is treated as
//! not supplied.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use binder_core::{Card, CardFilters, CardSearchQuery, Color, Rarity, StoreError};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CardSearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub colors: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(rename = "type", default)]
    pub type_contains: Option<String>,
    #[serde(default)]
    pub price_min: Option<String>,
    #[serde(default)]
    pub price_max: Option<String>,
    #[serde(default)]
    pub extras: Option<String>,
}

impl CardSearchParams {
    fn into_query(self) -> CardSearchQuery {
        CardSearchQuery {
            query: self.q.unwrap_or_default(),
            limit: self.limit.as_deref().and_then(|s| s.trim().parse().ok()),
            filters: CardFilters {
                colors: self.colors.as_deref().and_then(parse_colors),
                rarity: self.rarity.as_deref().and_then(Rarity::parse),
                type_contains: self.type_contains.filter(|t| !t.trim().is_empty()),
                price_min: self.price_min.as_deref().and_then(parse_number),
                price_max: self.price_max.as_deref().and_then(parse_number),
                extras: self.extras.as_deref().and_then(parse_boolish),
            },
        }
    }
}

/// Comma-separated color letters, upper-cased and filtered to
/// {W, U, B, R, G, C}. An empty result means the filter is not supplied.
fn parse_colors(raw: &str) -> Option<Vec<Color>> {
    let mut colors: Vec<Color> = Vec::new();
    for piece in raw.split(',') {
        let piece = piece.trim().to_uppercase();
        let Some(color) = piece.chars().next().filter(|_| piece.len() == 1).and_then(Color::from_letter) else {
            continue;
        };
        if !colors.contains(&color) {
            colors.push(color);
        }
    }

    if colors.is_empty() {
        None
    } else {
        Some(colors)
    }
}

/// "true"/"false" coerced; anything else is not supplied.
fn parse_boolish(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub cards: Vec<Card>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/cards/search
///
/// Runs the search pipeline and returns hydrated cards in search order.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CardSearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = params.into_query();

    let ids = state.store().search_card_ids(&query).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    // The batch fetch preserves the ranking the search produced.
    let cards = state.store().cards_by_ids(&ids).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(SearchResponse {
        count: cards.len(),
        cards,
    }))
}

/// GET /api/v1/cards/{id}
pub async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Card>, (StatusCode, Json<ErrorResponse>)> {
    match state.store().get_card(&id) {
        Ok(card) => Ok(Json(card)),
        Err(StoreError::NotFound(_)) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Card not found: {}", id),
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
