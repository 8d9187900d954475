//! SQLite persistence layer
//!
//! Key-based CRUD over three tables: `songs` (the catalog attendees
//! browse), `requests` (the live queue), and `settings` (key/value
//! configuration including the DJ PIN and the Google Sheet URL).

pub mod init;
pub mod models;
pub mod requests;
pub mod settings;
pub mod songs;

pub use init::{init_database, init_memory_database};
pub use models::{NewRequest, NewSong, RequestStatus, RequestWithSong, Song, SongRequest};
