//! vq-server library - song request queue service
//!
//! Serves the audience catalog/request API, the DJ console endpoints,
//! and the Google Sheets library sync.

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;
pub mod sheets;

use services::AuddClient;
use sheets::HttpSheetClient;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Sheet export fetcher for library sync
    pub sheets: Arc<HttpSheetClient>,
    /// AudD client; None when no API token is configured
    pub audd: Option<Arc<AuddClient>>,
}

impl AppState {
    pub fn new(db: SqlitePool, sheets: HttpSheetClient, audd: Option<AuddClient>) -> Self {
        Self {
            db,
            sheets: Arc::new(sheets),
            audd: audd.map(Arc::new),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/songs", get(api::list_songs).post(api::create_song))
        .route("/api/songs/:id", get(api::get_song))
        .route("/api/genres", get(api::list_genres))
        .route(
            "/api/requests",
            get(api::list_requests).post(api::create_request),
        )
        .route(
            "/api/requests/played",
            get(api::list_played).delete(api::clear_played),
        )
        .route("/api/requests/positions", post(api::update_positions))
        .route("/api/requests/:id", patch(api::update_status))
        .route(
            "/api/requests/check-duplicate/:song_id",
            get(api::check_duplicate),
        )
        .route("/api/settings", get(api::get_settings))
        .route("/api/verify-pin", post(api::verify_pin))
        .route("/api/update-settings", post(api::update_settings))
        .route("/api/sync-google-sheets", post(api::sync_google_sheets))
        .route("/api/recognize-song", post(api::recognize_song))
        .route("/api/get-lyrics", post(api::get_lyrics));

    Router::new()
        .merge(api_routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
