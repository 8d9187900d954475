//! Request queue database operations
//!
//! Audience submissions and the DJ console's triage view: status-filtered
//! listing joined with songs, status transitions, bulk position updates
//! for reordering, duplicate probing, and played-history maintenance.

use crate::db::models::{NewRequest, RequestStatus, RequestWithSong, Song, SongRequest};
use crate::db::songs::song_from_row;
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use uuid::Uuid;

const JOINED_COLUMNS: &str = "r.id AS request_id, r.song_id, r.requester_username, r.status, \
     r.is_tipped, r.position, r.created_at AS request_created_at, \
     r.updated_at AS request_updated_at, \
     s.id, s.title, s.artist, s.genre, s.is_available, s.created_at, s.updated_at";

fn request_from_row(row: &SqliteRow) -> Result<SongRequest> {
    let id_str: String = row.get("request_id");
    let song_id_str: String = row.get("song_id");
    let status_str: String = row.get("status");
    let is_tipped: i64 = row.get("is_tipped");

    Ok(SongRequest {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Bad request id '{}': {}", id_str, e)))?,
        song_id: Uuid::parse_str(&song_id_str)
            .map_err(|e| Error::Internal(format!("Bad song id '{}': {}", song_id_str, e)))?,
        requester_username: row.get("requester_username"),
        status: RequestStatus::parse(&status_str)
            .ok_or_else(|| Error::Internal(format!("Unknown request status '{}'", status_str)))?,
        is_tipped: is_tipped != 0,
        position: row.get("position"),
        created_at: row.get("request_created_at"),
        updated_at: row.get("request_updated_at"),
    })
}

fn joined_from_row(row: &SqliteRow) -> Result<RequestWithSong> {
    let song: Song = song_from_row(row)?;
    Ok(RequestWithSong {
        request: request_from_row(row)?,
        song,
    })
}

/// List requests in the given statuses, joined with their songs,
/// ordered by position then submission time
pub async fn list_requests(
    db: &SqlitePool,
    statuses: &[RequestStatus],
) -> Result<Vec<RequestWithSong>> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM requests r INNER JOIN songs s ON r.song_id = s.id WHERE r.status IN (",
        JOINED_COLUMNS
    ));
    let mut separated = qb.separated(", ");
    for status in statuses {
        separated.push_bind(status.as_str());
    }
    separated.push_unseparated(")");
    qb.push(" ORDER BY r.position ASC, r.created_at ASC");

    let rows = qb.build().fetch_all(db).await?;
    rows.iter().map(joined_from_row).collect()
}

/// Most recently played requests, newest first
pub async fn list_played_requests(db: &SqlitePool, limit: i64) -> Result<Vec<RequestWithSong>> {
    let sql = format!(
        "SELECT {} FROM requests r INNER JOIN songs s ON r.song_id = s.id \
         WHERE r.status = 'played' ORDER BY r.updated_at DESC LIMIT ?",
        JOINED_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(db).await?;
    rows.iter().map(joined_from_row).collect()
}

/// Load a single request joined with its song
pub async fn get_request(db: &SqlitePool, id: Uuid) -> Result<Option<RequestWithSong>> {
    let sql = format!(
        "SELECT {} FROM requests r INNER JOIN songs s ON r.song_id = s.id WHERE r.id = ?",
        JOINED_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(id.to_string())
        .fetch_optional(db)
        .await?;
    row.as_ref().map(joined_from_row).transpose()
}

/// Create a request; new requests enter the queue as pending
pub async fn create_request(db: &SqlitePool, request: &NewRequest) -> Result<RequestWithSong> {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO requests (id, song_id, requester_username, is_tipped) VALUES (?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(request.song_id.to_string())
    .bind(&request.requester_username)
    .bind(request.is_tipped as i64)
    .execute(db)
    .await?;

    get_request(db, id)
        .await?
        .ok_or_else(|| Error::Internal("Inserted request not found".to_string()))
}

/// Move a request to a new playback status
pub async fn update_request_status(
    db: &SqlitePool,
    id: Uuid,
    status: RequestStatus,
) -> Result<Option<RequestWithSong>> {
    let result = sqlx::query(
        "UPDATE requests SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(status.as_str())
    .bind(id.to_string())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_request(db, id).await
}

/// Bulk position update backing queue reordering
pub async fn update_request_positions(db: &SqlitePool, positions: &[(Uuid, i64)]) -> Result<()> {
    let mut tx = db.begin().await?;
    for (id, position) in positions {
        sqlx::query(
            "UPDATE requests SET position = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(position)
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// True when the song already has a request in the live queue
pub async fn has_active_request(db: &SqlitePool, song_id: Uuid) -> Result<bool> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT id FROM requests \
         WHERE song_id = ? AND status IN ('pending', 'next_up', 'playing') LIMIT 1",
    )
    .bind(song_id.to_string())
    .fetch_optional(db)
    .await?;

    Ok(row.is_some())
}

/// Delete all played requests, returning how many were removed
pub async fn clear_played_requests(db: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM requests WHERE status = 'played'")
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
