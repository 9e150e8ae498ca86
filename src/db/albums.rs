//! Saved album persistence
//!
//! Successful identifications are flattened into one row per album:
//! artist, title, cover_image, year, label, genre (JSON list), spotify_url,
//! discogs_url, plus id and created_at added by this boundary.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::IdentifiedRecord;

/// A saved library record (flattened identification)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAlbum {
    pub id: Uuid,
    pub artist: String,
    pub title: String,
    pub cover_image: Option<String>,
    pub year: String,
    pub label: String,
    pub genre: Vec<String>,
    pub spotify_url: Option<String>,
    pub discogs_url: String,
    pub created_at: String,
}

impl SavedAlbum {
    /// Flatten a successful identification for storage.
    pub fn from_record(record: &IdentifiedRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            artist: record.display.artist.clone(),
            title: record.display.title.clone(),
            cover_image: record.display.cover_image.clone(),
            year: record.details.year.clone(),
            label: record.details.label.clone(),
            genre: record.details.genre.clone(),
            spotify_url: record.links.spotify_url.clone(),
            discogs_url: record.links.discogs_url.clone(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Insert a saved album row.
pub async fn save_album(pool: &SqlitePool, album: &SavedAlbum) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO albums (id, artist, title, cover_image, year, label, genre, spotify_url, discogs_url, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(album.id.to_string())
    .bind(&album.artist)
    .bind(&album.title)
    .bind(&album.cover_image)
    .bind(&album.year)
    .bind(&album.label)
    .bind(serde_json::to_string(&album.genre)?)
    .bind(&album.spotify_url)
    .bind(&album.discogs_url)
    .bind(&album.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the whole library, most recently saved first.
pub async fn list_albums(pool: &SqlitePool) -> Result<Vec<SavedAlbum>> {
    let rows = sqlx::query(
        r#"
        SELECT id, artist, title, cover_image, year, label, genre, spotify_url, discogs_url, created_at
        FROM albums
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut albums = Vec::with_capacity(rows.len());
    for row in rows {
        let id_str: String = row.get("id");
        let genre_json: String = row.get("genre");

        albums.push(SavedAlbum {
            id: Uuid::parse_str(&id_str)?,
            artist: row.get("artist"),
            title: row.get("title"),
            cover_image: row.get("cover_image"),
            year: row.get("year"),
            label: row.get("label"),
            genre: serde_json::from_str(&genre_json).unwrap_or_default(),
            spotify_url: row.get("spotify_url"),
            discogs_url: row.get("discogs_url"),
            created_at: row.get("created_at"),
        });
    }

    Ok(albums)
}

/// Delete a saved album; returns whether a row existed.
pub async fn delete_album(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
