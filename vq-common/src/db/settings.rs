//! Settings database operations
//!
//! Get/set accessors for the settings table following the key-value
//! pattern. The DJ PIN and the Google Sheet URL live here; this module
//! never exposes the PIN through the public-settings view.

use crate::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::info;

/// Keys a DJ may write through the settings API
pub const ALLOWED_KEYS: &[&str] = &[
    "event_name",
    "dj_pin",
    "venmo_handle",
    "paypal_handle",
    "cashapp_handle",
    "google_sheet_url",
];

/// Keys safe to serve to unauthenticated audience clients
pub const PUBLIC_KEYS: &[&str] = &[
    "event_name",
    "venmo_handle",
    "paypal_handle",
    "cashapp_handle",
    "google_sheet_url",
];

/// Get the configured DJ PIN
pub async fn get_dj_pin(db: &SqlitePool) -> Result<Option<String>> {
    get_setting(db, "dj_pin").await
}

/// Get the configured Google Sheet URL, None when unset or blank
pub async fn get_google_sheet_url(db: &SqlitePool) -> Result<Option<String>> {
    Ok(get_setting::<String>(db, "google_sheet_url")
        .await?
        .filter(|v| !v.trim().is_empty()))
}

/// Settings safe for audience clients (PIN excluded)
pub async fn get_public_settings(db: &SqlitePool) -> Result<HashMap<String, String>> {
    let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
        .fetch_all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter(|(key, _)| PUBLIC_KEYS.contains(&key.as_str()))
        .collect())
}

/// Generic setting getter
pub async fn get_setting<T>(db: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match row {
        Some((value,)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting '{}' failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Generic setting setter (UPSERT)
pub async fn set_setting<T>(db: &SqlitePool, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

/// Seed default settings on first run (existing values untouched)
pub async fn init_default_settings(db: &SqlitePool) -> Result<()> {
    let defaults = [
        ("dj_pin", "1234"),
        ("event_name", "VQ"),
        ("venmo_handle", ""),
        ("paypal_handle", ""),
        ("cashapp_handle", ""),
        ("google_sheet_url", ""),
    ];

    for (key, value) in defaults {
        let result = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(db)
            .await?;
        if result.rows_affected() > 0 {
            info!("Initialized default setting: {}", key);
        }
    }

    Ok(())
}
