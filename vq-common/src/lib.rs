//! Shared library for VQ (live song-request queue)
//!
//! Holds the error type, configuration resolution, and the SQLite
//! persistence layer (songs, requests, settings) used by vq-server.

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
