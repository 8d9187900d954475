//! Request queue endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::error::DatabaseError;
use uuid::Uuid;

use vq_common::db::models::{NewRequest, RequestStatus, RequestWithSong};
use vq_common::db::requests;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RequestQuery {
    /// Comma-separated status filter; defaults to the live queue
    pub status: Option<String>,
}

/// GET /api/requests
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestQuery>,
) -> ApiResult<Json<Vec<RequestWithSong>>> {
    let statuses = match query.status.as_deref() {
        Some(raw) => {
            let mut statuses = Vec::new();
            for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                let status = RequestStatus::parse(token).ok_or_else(|| {
                    ApiError::BadRequest(format!("Unknown request status '{}'", token))
                })?;
                statuses.push(status);
            }
            statuses
        }
        None => RequestStatus::active().to_vec(),
    };

    if statuses.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let requests = requests::list_requests(&state.db, &statuses).await?;
    Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
pub struct PlayedQuery {
    pub limit: Option<i64>,
}

/// GET /api/requests/played
pub async fn list_played(
    State(state): State<AppState>,
    Query(query): Query<PlayedQuery>,
) -> ApiResult<Json<Vec<RequestWithSong>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let played = requests::list_played_requests(&state.db, limit).await?;
    Ok(Json(played))
}

/// POST /api/requests
///
/// Duplicate submissions are allowed; the client uses the duplicate
/// probe to warn before submitting.
pub async fn create_request(
    State(state): State<AppState>,
    Json(new_request): Json<NewRequest>,
) -> ApiResult<Json<RequestWithSong>> {
    if new_request.requester_username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username is required".to_string()));
    }

    let created = requests::create_request(&state.db, &new_request)
        .await
        .map_err(|e| match e {
            vq_common::Error::Database(sqlx::Error::Database(db_err))
                if db_err.message().contains("FOREIGN KEY") =>
            {
                ApiError::BadRequest("Song not found".to_string())
            }
            other => ApiError::Common(other),
        })?;
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
}

/// PATCH /api/requests/:id
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Json<RequestWithSong>> {
    let updated = requests::update_request_status(&state.db, id, update.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct PositionUpdate {
    pub id: Uuid,
    pub position: i64,
}

#[derive(Debug, Deserialize)]
pub struct PositionsPayload {
    pub positions: Vec<PositionUpdate>,
}

/// POST /api/requests/positions
pub async fn update_positions(
    State(state): State<AppState>,
    Json(payload): Json<PositionsPayload>,
) -> ApiResult<Json<Value>> {
    let positions: Vec<(Uuid, i64)> = payload
        .positions
        .iter()
        .map(|p| (p.id, p.position))
        .collect();
    requests::update_request_positions(&state.db, &positions).await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/requests/check-duplicate/:song_id
pub async fn check_duplicate(
    State(state): State<AppState>,
    Path(song_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let is_duplicate = requests::has_active_request(&state.db, song_id).await?;
    Ok(Json(json!({ "isDuplicate": is_duplicate })))
}

/// DELETE /api/requests/played
pub async fn clear_played(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let count = requests::clear_played_requests(&state.db).await?;
    Ok(Json(json!({ "success": true, "count": count })))
}
