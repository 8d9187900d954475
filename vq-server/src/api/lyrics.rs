//! Song recognition and lyrics lookup endpoints
//!
//! Thin pass-throughs to the AudD API. Both answer 503 when no API
//! token was configured at startup.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::services::{AuddClient, AuddError};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizePayload {
    pub audio_data: Option<String>,
}

/// POST /api/recognize-song
pub async fn recognize_song(
    State(state): State<AppState>,
    Json(payload): Json<RecognizePayload>,
) -> ApiResult<Json<Value>> {
    let audd = require_audd(&state, "Song recognition")?;
    let audio = payload
        .audio_data
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Audio data is required".to_string()))?;

    match audd.recognize(&audio).await {
        Ok(Some(song)) => Ok(Json(json!({ "found": true, "song": song }))),
        Ok(None) => Ok(Json(
            json!({ "found": false, "message": "No song recognized" }),
        )),
        Err(e) => Err(audd_error(e, "Failed to recognize song")),
    }
}

#[derive(Debug, Deserialize)]
pub struct LyricsPayload {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// POST /api/get-lyrics
pub async fn get_lyrics(
    State(state): State<AppState>,
    Json(payload): Json<LyricsPayload>,
) -> ApiResult<Json<Value>> {
    let audd = require_audd(&state, "Lyrics lookup")?;

    let title = payload.title.as_deref().map(str::trim).unwrap_or("");
    let artist = payload.artist.as_deref().map(str::trim).unwrap_or("");
    if title.is_empty() || artist.is_empty() {
        return Err(ApiError::BadRequest(
            "Title and artist are required".to_string(),
        ));
    }

    match audd.find_lyrics(title, artist).await {
        Ok(Some(lyrics)) => Ok(Json(json!({ "found": true, "lyrics": lyrics }))),
        Ok(None) => Ok(Json(json!({ "found": false, "message": "No lyrics found" }))),
        Err(e) => Err(audd_error(e, "Failed to get lyrics")),
    }
}

fn require_audd<'a>(state: &'a AppState, feature: &str) -> ApiResult<&'a AuddClient> {
    state.audd.as_deref().ok_or_else(|| {
        ApiError::ServiceUnavailable(format!(
            "{} is not configured. Add AUDD_API_TOKEN to enable this feature.",
            feature
        ))
    })
}

fn audd_error(error: AuddError, fallback: &str) -> ApiError {
    match error {
        AuddError::Rejected(message) => ApiError::BadRequest(message),
        other => {
            error!("AudD request failed: {}", other);
            ApiError::Internal(fallback.to_string())
        }
    }
}
