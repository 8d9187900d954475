//! Google Sheets song library import
//!
//! Pipeline: extract the spreadsheet id from the configured URL, discover
//! tabs via a chain of fallback strategies, fetch each tab as CSV,
//! normalize rows into songs, and atomically replace the catalog.

pub mod csv;
pub mod discovery;
pub mod fetch;
pub mod normalize;
pub mod sheet_url;
pub mod sync;

pub use fetch::{HttpSheetClient, SheetFetch};
pub use sync::{sync_library, SyncError, SyncOutcome};
