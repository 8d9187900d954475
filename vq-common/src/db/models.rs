//! Domain models for songs, requests, and settings

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog song available for audience browsing/requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub genre: Option<String>,
    #[serde(rename = "isAvailable")]
    pub is_available: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Insert payload for a song
///
/// Sheet-sourced songs are created available; ad-hoc audience custom
/// songs are created unavailable until the DJ approves them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub genre: Option<String>,
    #[serde(rename = "isAvailable", default)]
    pub is_available: bool,
}

/// Playback lifecycle of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    NextUp,
    Playing,
    Played,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::NextUp => "next_up",
            RequestStatus::Playing => "playing",
            RequestStatus::Played => "played",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "next_up" => Some(RequestStatus::NextUp),
            "playing" => Some(RequestStatus::Playing),
            "played" => Some(RequestStatus::Played),
            "rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }

    /// Statuses that count as "in the live queue" for duplicate checks
    /// and the default DJ console view
    pub fn active() -> [RequestStatus; 3] {
        [
            RequestStatus::Pending,
            RequestStatus::NextUp,
            RequestStatus::Playing,
        ]
    }
}

/// An audience request for a song
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRequest {
    pub id: Uuid,
    #[serde(rename = "songId")]
    pub song_id: Uuid,
    #[serde(rename = "requesterUsername")]
    pub requester_username: String,
    pub status: RequestStatus,
    #[serde(rename = "isTipped")]
    pub is_tipped: bool,
    pub position: i64,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Insert payload for a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    #[serde(rename = "songId")]
    pub song_id: Uuid,
    #[serde(rename = "requesterUsername")]
    pub requester_username: String,
    #[serde(rename = "isTipped", default)]
    pub is_tipped: bool,
}

/// Request joined with its song, as served to the DJ console
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithSong {
    #[serde(flatten)]
    pub request: SongRequest,
    pub song: Song,
}
