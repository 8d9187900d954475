//! Tab content fetching over an unversioned CSV export surface
//!
//! The HTTP GET sits behind the `SheetFetch` trait so the discovery chain
//! and the sync orchestrator can run against canned responses in tests.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use super::discovery::TabLocator;

const USER_AGENT: &str = concat!("VQ/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetch errors
///
/// Every variant is recoverable at the pipeline level: a failed fetch is
/// a miss for that strategy or tab, never a fatal sync error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Client construction failed: {0}")]
    Client(String),
}

/// What the pipeline needs from one HTTP GET
#[derive(Debug, Clone)]
pub struct FetchedText {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: String,
}

impl FetchedText {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// CSV-compatible content type; anything else is treated as a miss
    pub fn is_csv(&self) -> bool {
        match self.content_type.as_deref() {
            Some(ct) => ct.contains("csv") || ct.starts_with("text/plain"),
            None => false,
        }
    }
}

/// Plain-text GET seam between the sync pipeline and the network
pub trait SheetFetch: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<FetchedText, FetchError>> + Send;
}

/// Production fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpSheetClient {
    client: reqwest::Client,
}

impl HttpSheetClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl SheetFetch for HttpSheetClient {
    async fn get(&self, url: &str) -> Result<FetchedText, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        let content_type = header("content-type");
        let content_disposition = header("content-disposition");

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(FetchedText {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}

/// CSV export URL for a tab addressed by gid, or the default export when
/// no gid is given
pub fn export_csv_url(sheet_id: &str, gid: Option<&str>) -> String {
    match gid {
        Some(gid) => format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
            sheet_id, gid
        ),
        None => format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
            sheet_id
        ),
    }
}

/// CSV export URL for a tab addressed by display name (gviz endpoint)
pub fn gviz_csv_url(sheet_id: &str, tab_name: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/gviz/tq?tqx=out:csv&sheet={}",
        sheet_id,
        percent_encode(tab_name)
    )
}

/// Minimal query-component percent encoding (unreserved bytes pass through)
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Fetch one tab's rows as CSV lines
///
/// Fetches by gid when the locator has one (stable across tab renames),
/// by name otherwise. Returns `None` on any failure: non-success status,
/// non-CSV content type, or fewer than 2 lines after dropping blanks.
pub async fn fetch_tab<F: SheetFetch>(
    fetcher: &F,
    sheet_id: &str,
    locator: &TabLocator,
) -> Option<Vec<String>> {
    let url = match &locator.gid {
        Some(gid) => export_csv_url(sheet_id, Some(gid)),
        None => gviz_csv_url(sheet_id, &locator.name),
    };
    fetch_csv_lines(fetcher, &url).await
}

/// Fetch the sheet's default export (single-sheet fallback mode)
pub async fn fetch_default_export<F: SheetFetch>(
    fetcher: &F,
    sheet_id: &str,
) -> Option<Vec<String>> {
    fetch_csv_lines(fetcher, &export_csv_url(sheet_id, None)).await
}

pub(crate) async fn fetch_csv_lines<F: SheetFetch>(fetcher: &F, url: &str) -> Option<Vec<String>> {
    let response = match fetcher.get(url).await {
        Ok(response) => response,
        Err(e) => {
            debug!("Fetch miss for {}: {}", url, e);
            return None;
        }
    };

    if !response.is_success() {
        debug!("Fetch miss for {}: status {}", url, response.status);
        return None;
    }
    if !response.is_csv() {
        debug!(
            "Fetch miss for {}: content type {:?}",
            url, response.content_type
        );
        return None;
    }

    let lines: Vec<String> = response
        .body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect();

    // Header plus at least one data row
    if lines.len() < 2 {
        debug!("Fetch miss for {}: {} usable lines", url, lines.len());
        return None;
    }
    Some(lines)
}
