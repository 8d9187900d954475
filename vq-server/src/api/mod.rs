//! HTTP API handlers for vq-server

pub mod health;
pub mod lyrics;
pub mod requests;
pub mod settings;
pub mod songs;
pub mod sync;

pub use health::health_routes;
pub use lyrics::{get_lyrics, recognize_song};
pub use requests::{
    check_duplicate, clear_played, create_request, list_played, list_requests, update_positions,
    update_status,
};
pub use settings::{get_settings, update_settings, verify_pin};
pub use songs::{create_song, get_song, list_genres, list_songs};
pub use sync::sync_google_sheets;
