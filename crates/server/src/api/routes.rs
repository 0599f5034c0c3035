use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{cards, handlers, sets, sync};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Sync
        .route("/sync", post(sync::trigger_sync))
        .route("/sync/status", get(sync::get_status))
        .route("/sync/runs", get(sync::list_runs))
        .route("/sync/runs", delete(sync::prune_runs))
        // Cards
        .route("/cards/search", get(cards::search))
        .route("/cards/{id}", get(cards::get_card))
        // Sets and catalog maintenance
        .route("/sets", get(sets::list_sets))
        .route("/sets/{code}", get(sets::get_set))
        .route("/catalog/stats", get(sets::get_stats))
        .route("/catalog", delete(sets::clear_catalog))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics).with_state(state))
        .layer(TraceLayer::new_for_http())
}
