//! Sync orchestrator: turn the configured sheet into the song catalog

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use vq_common::db::settings;
use vq_common::db::songs;

use super::discovery::Strategy;
use super::fetch::{self, SheetFetch};
use super::normalize::{self, TabRows};
use super::sheet_url::extract_sheet_id;

/// Tab names the catalog historically shipped with. Surfaced in the
/// zero-song error response so the operator can fix the sheet layout.
pub const EXPECTED_TABS: [&str; 7] = [
    "Freestyle|Dance",
    "Hip Hop|Rap|Funk|R&B",
    "Rock",
    "New Wave",
    "Slow Jamz",
    "Disco",
    "Other",
];

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid DJ PIN")]
    InvalidPin,

    #[error("Google Sheet URL not configured. Add it in DJ Settings.")]
    NotConfigured,

    #[error("Invalid Google Sheet URL")]
    InvalidUrl,

    #[error("No songs found. Make sure the Google Sheet is publicly accessible and has the correct tab names.")]
    NoSongs,

    #[error(transparent)]
    Database(#[from] vq_common::Error),
}

/// What a completed sync produced
#[derive(Debug)]
pub struct SyncOutcome {
    pub count: u64,
    pub tab_names: Vec<String>,
}

/// Replace the song catalog from the configured Google Sheet
///
/// Authorization is checked before any network traffic. Discovery
/// strategies run in fixed order and the first one yielding at least one
/// fetchable tab wins; when all of them miss, the sheet's default export
/// is imported as a single unnamed tab. The catalog is only touched once
/// at least one song normalized successfully.
pub async fn sync_library<F: SheetFetch>(
    db: &SqlitePool,
    fetcher: &F,
    pin: &str,
) -> Result<SyncOutcome, SyncError> {
    let stored_pin = settings::get_dj_pin(db).await.map_err(SyncError::Database)?;
    if stored_pin.as_deref() != Some(pin) {
        return Err(SyncError::InvalidPin);
    }

    let url = settings::get_google_sheet_url(db)
        .await
        .map_err(SyncError::Database)?
        .ok_or(SyncError::NotConfigured)?;
    let sheet_id = extract_sheet_id(&url).ok_or(SyncError::InvalidUrl)?;

    info!("Starting library sync for sheet {}", sheet_id);

    let tabs = discover_and_fetch(fetcher, sheet_id).await;

    let (songs, tab_names) = if tabs.is_empty() {
        warn!("All discovery strategies missed; trying default export");
        match fetch::fetch_default_export(fetcher, sheet_id).await {
            Some(lines) => (
                normalize::normalize_single_sheet(&lines),
                vec!["default".to_string()],
            ),
            None => (Vec::new(), Vec::new()),
        }
    } else {
        let names = tabs.iter().map(|t| t.tab_name.clone()).collect();
        (normalize::normalize(&tabs), names)
    };

    if songs.is_empty() {
        return Err(SyncError::NoSongs);
    }

    let count = songs::replace_catalog(db, &songs)
        .await
        .map_err(SyncError::Database)?;

    info!("Library sync complete: {} songs from {} tabs", count, tab_names.len());

    Ok(SyncOutcome { count, tab_names })
}

/// Run the strategy chain, keeping the first strategy whose discovered
/// tabs include at least one that actually exports data
async fn discover_and_fetch<F: SheetFetch>(fetcher: &F, sheet_id: &str) -> Vec<TabRows> {
    for strategy in Strategy::CHAIN {
        let locators = strategy.run(fetcher, sheet_id).await;
        if locators.is_empty() {
            continue;
        }

        let mut tabs = Vec::new();
        for locator in &locators {
            if let Some(lines) = fetch::fetch_tab(fetcher, sheet_id, locator).await {
                tabs.push(TabRows {
                    tab_name: locator.name.clone(),
                    lines,
                });
            }
        }

        if !tabs.is_empty() {
            info!(
                "Discovery via {:?}: {} of {} tabs fetched",
                strategy,
                tabs.len(),
                locators.len()
            );
            return tabs;
        }
        warn!("Discovery via {:?} found tabs but none fetched", strategy);
    }
    Vec::new()
}
