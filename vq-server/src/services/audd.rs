//! AudD API client
//!
//! Song recognition from captured audio plus lyrics lookup by title and
//! artist. The API token comes from the environment; when it is absent
//! the client is not constructed and the endpoints report unavailable.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const AUDD_RECOGNIZE_URL: &str = "https://api.audd.io/";
const AUDD_LYRICS_URL: &str = "https://api.audd.io/findLyrics/";
const USER_AGENT: &str = concat!("VQ/", env!("CARGO_PKG_VERSION"));

/// AudD client errors
#[derive(Debug, Error)]
pub enum AuddError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}")]
    Api(u16),

    /// AudD returned `status: "error"` with a message
    #[error("{0}")]
    Rejected(String),
}

/// Recognition result forwarded to the client UI
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedSong {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub release_date: Option<String>,
    pub lyrics: Option<String>,
    pub spotify: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LyricsMatch {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub lyrics: Option<String>,
}

/// AudD API client
pub struct AuddClient {
    http_client: reqwest::Client,
    api_token: String,
}

impl AuddClient {
    /// Build a client from the `AUDD_API_TOKEN` environment variable.
    /// Returns `None` when the token is unset or blank.
    pub fn from_env() -> Result<Option<Self>, AuddError> {
        match std::env::var("AUDD_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Ok(Some(Self::new(token)?)),
            _ => Ok(None),
        }
    }

    pub fn new(api_token: String) -> Result<Self, AuddError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuddError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_token,
        })
    }

    /// Recognize a song from base64-encoded audio data
    pub async fn recognize(&self, audio_data: &str) -> Result<Option<RecognizedSong>, AuddError> {
        let params = [
            ("api_token", self.api_token.as_str()),
            ("audio", audio_data),
            ("return", "lyrics,spotify"),
        ];
        let body = self.post_form(AUDD_RECOGNIZE_URL, &params).await?;

        let result = &body["result"];
        if result.is_null() {
            return Ok(None);
        }

        Ok(Some(RecognizedSong {
            title: string_field(result, "title"),
            artist: string_field(result, "artist"),
            album: string_field(result, "album"),
            release_date: string_field(result, "release_date"),
            lyrics: result["lyrics"]["lyrics"].as_str().map(|s| s.to_string()),
            spotify: non_null(&result["spotify"]),
        }))
    }

    /// Look up lyrics by title and artist; first match wins
    pub async fn find_lyrics(
        &self,
        title: &str,
        artist: &str,
    ) -> Result<Option<LyricsMatch>, AuddError> {
        let query = format!("{} {}", artist, title);
        let params = [
            ("api_token", self.api_token.as_str()),
            ("q", query.as_str()),
        ];
        let body = self.post_form(AUDD_LYRICS_URL, &params).await?;

        let Some(matches) = body["result"].as_array() else {
            return Ok(None);
        };
        let Some(first) = matches.first() else {
            return Ok(None);
        };

        Ok(Some(LyricsMatch {
            title: string_field(first, "title"),
            artist: string_field(first, "artist"),
            lyrics: string_field(first, "lyrics"),
        }))
    }

    async fn post_form(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, AuddError> {
        let response = self
            .http_client
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| AuddError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuddError::Api(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuddError::Network(e.to_string()))?;

        if body["status"].as_str() == Some("error") {
            let message = body["error"]["error_message"]
                .as_str()
                .unwrap_or("Request rejected")
                .to_string();
            return Err(AuddError::Rejected(message));
        }
        Ok(body)
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value[key].as_str().map(|s| s.to_string())
}

fn non_null(value: &Value) -> Option<Value> {
    if value.is_null() {
        None
    } else {
        Some(value.clone())
    }
}
