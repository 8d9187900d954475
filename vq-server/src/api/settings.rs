//! Settings endpoints
//!
//! The audience-facing settings view never includes the DJ PIN. Writes
//! re-validate the PIN on every call and only touch allowlisted keys.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use vq_common::db::settings;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
) -> ApiResult<Json<HashMap<String, String>>> {
    let public = settings::get_public_settings(&state.db).await?;
    Ok(Json(public))
}

#[derive(Debug, Deserialize)]
pub struct PinPayload {
    pub pin: String,
}

/// POST /api/verify-pin
pub async fn verify_pin(
    State(state): State<AppState>,
    Json(payload): Json<PinPayload>,
) -> ApiResult<Json<Value>> {
    let stored = settings::get_dj_pin(&state.db).await?;
    let valid = stored.as_deref() == Some(payload.pin.as_str());
    Ok(Json(json!({ "valid": valid })))
}

#[derive(Debug, Deserialize)]
pub struct SettingUpdate {
    pub pin: String,
    pub key: String,
    pub value: String,
}

/// POST /api/update-settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingUpdate>,
) -> ApiResult<Json<Value>> {
    let stored = settings::get_dj_pin(&state.db).await?;
    if stored.as_deref() != Some(update.pin.as_str()) {
        return Err(ApiError::Unauthorized("Invalid DJ PIN".to_string()));
    }

    if !settings::ALLOWED_KEYS.contains(&update.key.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Setting '{}' cannot be changed",
            update.key
        )));
    }

    if update.key == "dj_pin"
        && (update.value.len() != 4 || !update.value.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(ApiError::BadRequest(
            "PIN must be exactly 4 digits".to_string(),
        ));
    }

    settings::set_setting(&state.db, &update.key, &update.value).await?;
    Ok(Json(json!({ "success": true })))
}
