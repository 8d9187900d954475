//! External service clients

pub mod audd;

pub use audd::{AuddClient, AuddError};
