//! Library sync endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::sheets::sync::{sync_library, SyncError, EXPECTED_TABS};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncPayload {
    pub pin: String,
}

/// POST /api/sync-google-sheets
///
/// Success reports how many songs were imported and which tabs fed
/// them. The zero-song failure includes the historically expected tab
/// names so the operator can compare against their sheet.
pub async fn sync_google_sheets(
    State(state): State<AppState>,
    Json(payload): Json<SyncPayload>,
) -> Response {
    let outcome = match sync_library(&state.db, state.sheets.as_ref(), &payload.pin).await {
        Ok(outcome) => outcome,
        Err(e) => return sync_error_response(e),
    };

    // sheets and genres are the same list, kept as two fields for the
    // client's benefit
    Json(json!({
        "success": true,
        "count": outcome.count,
        "sheets": outcome.tab_names,
        "genres": outcome.tab_names,
    }))
    .into_response()
}

fn sync_error_response(error: SyncError) -> Response {
    let status = match &error {
        SyncError::InvalidPin => StatusCode::UNAUTHORIZED,
        SyncError::NotConfigured | SyncError::InvalidUrl | SyncError::NoSongs => {
            StatusCode::BAD_REQUEST
        }
        SyncError::Database(e) => {
            error!("Library sync failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let body = match &error {
        SyncError::NoSongs => json!({
            "error": error.to_string(),
            "expectedTabs": EXPECTED_TABS,
        }),
        _ => json!({ "error": error.to_string() }),
    };

    (status, Json(body)).into_response()
}
