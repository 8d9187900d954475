//! Song catalog database operations
//!
//! Browsing queries for the audience view plus `replace_catalog`, the
//! destructive bulk load driven by the Google Sheet sync pipeline.

use crate::db::models::{NewSong, Song};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, SqlitePool};
use uuid::Uuid;

/// Batch size for catalog bulk inserts, bounds single-statement size
const INSERT_BATCH_SIZE: usize = 50;

pub(crate) fn song_from_row(row: &SqliteRow) -> Result<Song> {
    let id_str: String = row.get("id");
    let is_available: i64 = row.get("is_available");

    Ok(Song {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Bad song id '{}': {}", id_str, e)))?,
        title: row.get("title"),
        artist: row.get("artist"),
        genre: row.get("genre"),
        is_available: is_available != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// List available songs, optionally filtered by a title/artist substring
/// search and a genre set, ordered by title
pub async fn list_songs(
    db: &SqlitePool,
    search: Option<&str>,
    genres: &[String],
) -> Result<Vec<Song>> {
    let mut qb = QueryBuilder::new(
        "SELECT id, title, artist, genre, is_available, created_at, updated_at \
         FROM songs WHERE is_available = 1",
    );

    if let Some(query) = search.map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", query);
        qb.push(" AND (title LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR artist LIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if !genres.is_empty() {
        qb.push(" AND genre IN (");
        let mut separated = qb.separated(", ");
        for genre in genres {
            separated.push_bind(genre.clone());
        }
        separated.push_unseparated(")");
    }

    qb.push(" ORDER BY title ASC");

    let rows = qb.build().fetch_all(db).await?;
    rows.iter().map(song_from_row).collect()
}

/// Load a song by id
pub async fn get_song(db: &SqlitePool, id: Uuid) -> Result<Option<Song>> {
    let row = sqlx::query(
        "SELECT id, title, artist, genre, is_available, created_at, updated_at \
         FROM songs WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(db)
    .await?;

    row.as_ref().map(song_from_row).transpose()
}

/// Insert a single song and return the stored row
pub async fn create_song(db: &SqlitePool, song: &NewSong) -> Result<Song> {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO songs (id, title, artist, genre, is_available) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.genre)
    .bind(song.is_available as i64)
    .execute(db)
    .await?;

    get_song(db, id)
        .await?
        .ok_or_else(|| Error::Internal("Inserted song not found".to_string()))
}

/// Update title/artist of an existing song
pub async fn update_song(
    db: &SqlitePool,
    id: Uuid,
    title: Option<&str>,
    artist: Option<&str>,
) -> Result<Option<Song>> {
    let result = sqlx::query(
        "UPDATE songs SET \
             title = COALESCE(?, title), \
             artist = COALESCE(?, artist), \
             updated_at = CURRENT_TIMESTAMP \
         WHERE id = ?",
    )
    .bind(title)
    .bind(artist)
    .bind(id.to_string())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_song(db, id).await
}

/// Distinct genres of available songs, sorted
pub async fn list_genres(db: &SqlitePool) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT genre FROM songs \
         WHERE is_available = 1 AND genre IS NOT NULL \
         ORDER BY genre ASC",
    )
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(|(g,)| g).collect())
}

/// Replace the entire song catalog in one transaction
///
/// Deletes every existing song (and, with it, every request) and inserts
/// the new set in bounded batches. Any failed batch rolls the whole
/// replacement back, so the prior catalog survives a partial failure.
/// Callers must not pass an empty list; the sync orchestrator refuses an
/// empty result before reaching this point.
pub async fn replace_catalog(db: &SqlitePool, songs: &[NewSong]) -> Result<u64> {
    let mut tx = db.begin().await?;

    // SQLite foreign_keys is per-connection; delete dependents explicitly
    // rather than relying on the cascade.
    sqlx::query("DELETE FROM requests").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM songs").execute(&mut *tx).await?;

    let mut inserted: u64 = 0;
    for chunk in songs.chunks(INSERT_BATCH_SIZE) {
        let mut qb =
            QueryBuilder::new("INSERT INTO songs (id, title, artist, genre, is_available) ");
        qb.push_values(chunk, |mut b, song| {
            b.push_bind(Uuid::new_v4().to_string())
                .push_bind(&song.title)
                .push_bind(&song.artist)
                .push_bind(&song.genre)
                .push_bind(song.is_available as i64);
        });
        let result = qb.build().execute(&mut *tx).await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}
