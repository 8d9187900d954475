//! Song catalog endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use vq_common::db::models::{NewSong, Song};
use vq_common::db::songs;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SongQuery {
    pub search: Option<String>,
    /// Comma-separated genre filter
    pub genres: Option<String>,
}

/// GET /api/songs
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<SongQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let genres: Vec<String> = query
        .genres
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty())
        .collect();

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let songs = songs::list_songs(&state.db, search, &genres).await?;
    Ok(Json(songs))
}

/// GET /api/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Song>> {
    let song = songs::get_song(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Song not found".to_string()))?;
    Ok(Json(song))
}

/// POST /api/songs
///
/// Ad-hoc audience custom songs enter the catalog unavailable; the
/// request form shows them to the DJ but browsing does not.
pub async fn create_song(
    State(state): State<AppState>,
    Json(new_song): Json<NewSong>,
) -> ApiResult<Json<Song>> {
    if new_song.title.trim().is_empty() || new_song.artist.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Title and artist are required".to_string(),
        ));
    }

    // Availability is not client-controlled here
    let new_song = NewSong {
        is_available: false,
        ..new_song
    };
    let song = songs::create_song(&state.db, &new_song).await?;
    Ok(Json(song))
}

/// GET /api/genres
pub async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let genres = songs::list_genres(&state.db).await?;
    Ok(Json(genres))
}
