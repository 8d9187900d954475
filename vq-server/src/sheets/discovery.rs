//! Tab discovery strategy chain
//!
//! The spreadsheet's tab-enumeration surface is not a stable contract, so
//! discovery is an ordered chain of independent strategies sharing one
//! interface: given a sheet id, produce `(name, gid)` locators. Strategies
//! are tried in order; the orchestrator keeps the first strategy whose
//! locators actually yield data rows. A strategy that throws internally
//! simply yields nothing.

use serde_json::Value;
use tracing::debug;

use super::fetch::{export_csv_url, FetchedText, SheetFetch};

/// How far past an id marker to look for the paired display name
const SCRAPE_WINDOW: usize = 400;

/// Bounded gid probing limits
const MAX_PROBE_GID: u64 = 400;
const MAX_CONSECUTIVE_MISSES: u32 = 50;

/// One discovered worksheet tab
///
/// `gid = None` means the tab can only be fetched through the
/// name-addressed export endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLocator {
    pub name: String,
    pub gid: Option<String>,
}

/// Discovery strategies in fallback order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Scrape the human-facing document view for gid/name pairs
    DocumentScrape,
    /// Public worksheet listing feed (only present on published sheets)
    WorksheetFeed,
    /// Probe small numeric gids and keep the ones that export real data
    GidProbe,
}

impl Strategy {
    pub const CHAIN: [Strategy; 3] = [
        Strategy::DocumentScrape,
        Strategy::WorksheetFeed,
        Strategy::GidProbe,
    ];

    pub async fn run<F: SheetFetch>(&self, fetcher: &F, sheet_id: &str) -> Vec<TabLocator> {
        match self {
            Strategy::DocumentScrape => document_scrape(fetcher, sheet_id).await,
            Strategy::WorksheetFeed => worksheet_feed(fetcher, sheet_id).await,
            Strategy::GidProbe => gid_probe(fetcher, sheet_id).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy 1: document-metadata scrape
// ---------------------------------------------------------------------------

struct ScrapePattern {
    id_key: &'static str,
    id_quoted: bool,
    name_key: &'static str,
}

/// Marker patterns observed in the document view, newest first. None of
/// them is contractual, hence the list.
const SCRAPE_PATTERNS: &[ScrapePattern] = &[
    ScrapePattern {
        id_key: "\"sheetId\":",
        id_quoted: false,
        name_key: "\"title\":\"",
    },
    ScrapePattern {
        id_key: "\"gid\":\"",
        id_quoted: true,
        name_key: "\"name\":\"",
    },
    ScrapePattern {
        id_key: "\"gid\":",
        id_quoted: false,
        name_key: "\"name\":\"",
    },
];

async fn document_scrape<F: SheetFetch>(fetcher: &F, sheet_id: &str) -> Vec<TabLocator> {
    let url = format!("https://docs.google.com/spreadsheets/d/{}/edit", sheet_id);
    let body = match fetcher.get(&url).await {
        Ok(response) if response.is_success() => response.body,
        Ok(response) => {
            debug!("Document scrape: status {}", response.status);
            return Vec::new();
        }
        Err(e) => {
            debug!("Document scrape failed: {}", e);
            return Vec::new();
        }
    };

    for pattern in SCRAPE_PATTERNS {
        let locators = scan_pattern(&body, pattern);
        if !locators.is_empty() {
            debug!(
                "Document scrape: {} tabs via marker {}",
                locators.len(),
                pattern.id_key
            );
            return locators;
        }
    }
    Vec::new()
}

fn scan_pattern(body: &str, pattern: &ScrapePattern) -> Vec<TabLocator> {
    let mut locators: Vec<TabLocator> = Vec::new();
    let mut rest = body;

    while let Some(idx) = rest.find(pattern.id_key) {
        let after_key = &rest[idx + pattern.id_key.len()..];
        rest = after_key;

        let digits: String = after_key
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            continue;
        }
        if pattern.id_quoted && !after_key[digits.len()..].starts_with('"') {
            continue;
        }

        let window = clamp_to_char_boundary(after_key, SCRAPE_WINDOW.min(after_key.len()));
        let Some(name_idx) = after_key[..window].find(pattern.name_key) else {
            continue;
        };
        let Some(name) = read_json_string(&after_key[name_idx + pattern.name_key.len()..]) else {
            continue;
        };
        if name.trim().is_empty() {
            continue;
        }

        if locators.iter().all(|l| l.gid.as_deref() != Some(digits.as_str())) {
            locators.push(TabLocator {
                name,
                gid: Some(digits),
            });
        }
    }
    locators
}

/// Largest index <= `idx` that falls on a char boundary
fn clamp_to_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Read a JSON string body up to its closing quote, decoding escapes
fn read_json_string(s: &str) -> Option<String> {
    let mut raw = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(decode_escapes(&raw)),
            '\\' => {
                raw.push('\\');
                raw.push(chars.next()?);
            }
            _ => raw.push(c),
        }
    }
    None
}

/// Decode backslash escapes, including `\uXXXX` (with surrogate pairs)
pub(crate) fn decode_escapes(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' || i + 1 >= chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        match chars[i + 1] {
            'u' => {
                if let Some(unit) = hex4(&chars, i + 2) {
                    let mut advance = 6;
                    let code = if (0xD800..0xDC00).contains(&unit) {
                        // High surrogate: try to combine with a following \uXXXX
                        match hex4_after_escape(&chars, i + 6) {
                            Some(low) if (0xDC00..0xE000).contains(&low) => {
                                advance = 12;
                                0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                            }
                            _ => unit,
                        }
                    } else {
                        unit
                    };
                    out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                    i += advance;
                } else {
                    out.push(chars[i]);
                    i += 1;
                }
            }
            'n' => {
                out.push('\n');
                i += 2;
            }
            't' => {
                out.push('\t');
                i += 2;
            }
            other => {
                out.push(other);
                i += 2;
            }
        }
    }
    out
}

fn hex4(chars: &[char], start: usize) -> Option<u32> {
    if start + 4 > chars.len() {
        return None;
    }
    let mut value = 0u32;
    for &c in &chars[start..start + 4] {
        value = value * 16 + c.to_digit(16)?;
    }
    Some(value)
}

fn hex4_after_escape(chars: &[char], start: usize) -> Option<u32> {
    if chars.get(start) == Some(&'\\') && chars.get(start + 1) == Some(&'u') {
        hex4(chars, start + 2)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Strategy 2: public worksheet listing feed
// ---------------------------------------------------------------------------

async fn worksheet_feed<F: SheetFetch>(fetcher: &F, sheet_id: &str) -> Vec<TabLocator> {
    let url = format!(
        "https://spreadsheets.google.com/feeds/worksheets/{}/public/basic?alt=json",
        sheet_id
    );
    let body = match fetcher.get(&url).await {
        Ok(response) if response.is_success() => response.body,
        // Absence of the feed is the expected outcome for unpublished
        // sheets, not an error.
        Ok(response) => {
            debug!("Worksheet feed: status {}", response.status);
            return Vec::new();
        }
        Err(e) => {
            debug!("Worksheet feed failed: {}", e);
            return Vec::new();
        }
    };

    let Ok(json) = serde_json::from_str::<Value>(&body) else {
        return Vec::new();
    };
    let Some(entries) = json["feed"]["entry"].as_array() else {
        return Vec::new();
    };

    let mut locators = Vec::new();
    for entry in entries {
        let Some(name) = entry["title"]["$t"].as_str() else {
            continue;
        };
        if name.trim().is_empty() {
            continue;
        }
        // The gid shows up in link hrefs on some feed vintages; fall back
        // to name-addressed fetching when it does not.
        let gid = find_gid_param(&entry.to_string());
        locators.push(TabLocator {
            name: name.to_string(),
            gid,
        });
    }
    debug!("Worksheet feed: {} tabs", locators.len());
    locators
}

fn find_gid_param(raw: &str) -> Option<String> {
    let idx = raw.find("gid=")?;
    let digits: String = raw[idx + 4..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

// ---------------------------------------------------------------------------
// Strategy 3: bounded numeric-locator probing
// ---------------------------------------------------------------------------

async fn gid_probe<F: SheetFetch>(fetcher: &F, sheet_id: &str) -> Vec<TabLocator> {
    let mut locators = Vec::new();
    let mut consecutive_misses = 0u32;

    for gid in 0..=MAX_PROBE_GID {
        let url = export_csv_url(sheet_id, Some(&gid.to_string()));
        let hit = match fetcher.get(&url).await {
            Ok(response) => probe_hit(&response),
            Err(_) => None,
        };

        match hit {
            Some(name_hint) => {
                consecutive_misses = 0;
                let name = name_hint.unwrap_or_else(|| format!("Sheet {}", gid));
                locators.push(TabLocator {
                    name,
                    gid: Some(gid.to_string()),
                });
            }
            None => {
                consecutive_misses += 1;
                if consecutive_misses >= MAX_CONSECUTIVE_MISSES {
                    break;
                }
            }
        }
    }
    debug!("Gid probe: {} tabs", locators.len());
    locators
}

/// A probe hit is a successful, CSV-typed response with at least a header
/// and one data row. Returns the tab name recovered from response
/// metadata, when any.
fn probe_hit(response: &FetchedText) -> Option<Option<String>> {
    if !response.is_success() || !response.is_csv() {
        return None;
    }
    let rows = response
        .body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count();
    if rows < 2 {
        return None;
    }
    Some(tab_name_from_disposition(
        response.content_disposition.as_deref(),
    ))
}

/// Export filenames look like `"Document Title - Tab Name.csv"`
fn tab_name_from_disposition(disposition: Option<&str>) -> Option<String> {
    let disposition = disposition?;
    let idx = disposition.find("filename=\"")?;
    let rest = &disposition[idx + 10..];
    let filename = &rest[..rest.find('"')?];
    let stem = filename.strip_suffix(".csv").unwrap_or(filename);
    let name = match stem.rfind(" - ") {
        Some(pos) => &stem[pos + 3..],
        None => stem,
    };
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::fetch::FetchError;
    use std::collections::HashMap;

    struct MapFetcher {
        responses: HashMap<String, FetchedText>,
    }

    impl MapFetcher {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        fn insert(&mut self, url: &str, response: FetchedText) {
            self.responses.insert(url.to_string(), response);
        }
    }

    impl SheetFetch for MapFetcher {
        async fn get(&self, url: &str) -> Result<FetchedText, FetchError> {
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Network(format!("no response for {}", url)))
        }
    }

    fn csv_response(body: &str, disposition: Option<&str>) -> FetchedText {
        FetchedText {
            status: 200,
            content_type: Some("text/csv".to_string()),
            content_disposition: disposition.map(|d| d.to_string()),
            body: body.to_string(),
        }
    }

    fn html_response(body: &str) -> FetchedText {
        FetchedText {
            status: 200,
            content_type: Some("text/html".to_string()),
            content_disposition: None,
            body: body.to_string(),
        }
    }

    #[test]
    fn scan_sheetid_title_pairs() {
        let body = r#"junk {"sheetId":0,"title":"Rock","index":0} more {"sheetId":1234,"title":"Slow Jamz"} tail"#;
        let locators = scan_pattern(body, &SCRAPE_PATTERNS[0]);
        assert_eq!(
            locators,
            vec![
                TabLocator { name: "Rock".to_string(), gid: Some("0".to_string()) },
                TabLocator { name: "Slow Jamz".to_string(), gid: Some("1234".to_string()) },
            ]
        );
    }

    #[test]
    fn scan_ignores_duplicate_gids() {
        let body = r#"{"sheetId":7,"title":"Rock"} {"sheetId":7,"title":"Rock"}"#;
        let locators = scan_pattern(body, &SCRAPE_PATTERNS[0]);
        assert_eq!(locators.len(), 1);
    }

    #[test]
    fn scan_decodes_escaped_unicode_names() {
        let body = r#"{"sheetId":3,"title":"Caf\u00e9 Beats"}"#;
        let locators = scan_pattern(body, &SCRAPE_PATTERNS[0]);
        assert_eq!(locators[0].name, "Café Beats");
    }

    #[test]
    fn decode_escapes_handles_surrogate_pairs() {
        assert_eq!(decode_escapes(r"\ud83c\udfb5 Mix"), "\u{1F3B5} Mix");
        assert_eq!(decode_escapes("plain"), "plain");
        assert_eq!(decode_escapes(r#"Rock \"n\" Roll"#), "Rock \"n\" Roll");
    }

    #[tokio::test]
    async fn document_scrape_finds_tabs() {
        let mut fetcher = MapFetcher::new();
        fetcher.insert(
            "https://docs.google.com/spreadsheets/d/XYZ/edit",
            html_response(r#"<html>{"sheetId":0,"title":"Rock"},{"sheetId":99,"title":"Disco"}</html>"#),
        );

        let locators = Strategy::DocumentScrape.run(&fetcher, "XYZ").await;
        assert_eq!(locators.len(), 2);
        assert_eq!(locators[1].name, "Disco");
        assert_eq!(locators[1].gid.as_deref(), Some("99"));
    }

    #[tokio::test]
    async fn worksheet_feed_parses_entries() {
        let feed = r#"{"feed":{"entry":[
            {"title":{"$t":"Rock"},"link":[{"href":"https://docs.google.com/spreadsheets/d/XYZ/export?gid=0"}]},
            {"title":{"$t":"Disco"},"id":{"$t":"https://spreadsheets.google.com/feeds/worksheets/XYZ/public/basic/od7"}}
        ]}}"#;
        let mut fetcher = MapFetcher::new();
        fetcher.insert(
            "https://spreadsheets.google.com/feeds/worksheets/XYZ/public/basic?alt=json",
            FetchedText {
                status: 200,
                content_type: Some("application/json".to_string()),
                content_disposition: None,
                body: feed.to_string(),
            },
        );

        let locators = Strategy::WorksheetFeed.run(&fetcher, "XYZ").await;
        assert_eq!(locators.len(), 2);
        assert_eq!(locators[0].gid.as_deref(), Some("0"));
        // No gid anywhere in the entry: fetch by name instead
        assert_eq!(locators[1].gid, None);
        assert_eq!(locators[1].name, "Disco");
    }

    #[tokio::test]
    async fn feed_absence_is_not_an_error() {
        let mut fetcher = MapFetcher::new();
        fetcher.insert(
            "https://spreadsheets.google.com/feeds/worksheets/XYZ/public/basic?alt=json",
            FetchedText {
                status: 404,
                content_type: None,
                content_disposition: None,
                body: String::new(),
            },
        );
        assert!(Strategy::WorksheetFeed.run(&fetcher, "XYZ").await.is_empty());
    }

    #[tokio::test]
    async fn gid_probe_collects_hits_and_stops_after_miss_run() {
        let mut fetcher = MapFetcher::new();
        fetcher.insert(
            "https://docs.google.com/spreadsheets/d/XYZ/export?format=csv&gid=0",
            csv_response(
                "Title,Artist\nSong A,Artist 1\n",
                Some("attachment; filename=\"My Library - Rock.csv\""),
            ),
        );
        fetcher.insert(
            "https://docs.google.com/spreadsheets/d/XYZ/export?format=csv&gid=2",
            csv_response("Title,Artist\nSong B,Artist 2\n", None),
        );
        // Everything else falls through to a network error (a miss)

        let locators = Strategy::GidProbe.run(&fetcher, "XYZ").await;
        assert_eq!(locators.len(), 2);
        assert_eq!(locators[0].name, "Rock");
        assert_eq!(locators[0].gid.as_deref(), Some("0"));
        assert_eq!(locators[1].name, "Sheet 2");
    }

    #[tokio::test]
    async fn gid_probe_rejects_single_line_exports() {
        let mut fetcher = MapFetcher::new();
        fetcher.insert(
            "https://docs.google.com/spreadsheets/d/XYZ/export?format=csv&gid=0",
            csv_response("Title,Artist\n", None),
        );
        assert!(Strategy::GidProbe.run(&fetcher, "XYZ").await.is_empty());
    }

    #[test]
    fn disposition_filename_parsing() {
        assert_eq!(
            tab_name_from_disposition(Some("attachment; filename=\"Lib - New Wave.csv\"")),
            Some("New Wave".to_string())
        );
        assert_eq!(
            tab_name_from_disposition(Some("attachment; filename=\"flat.csv\"")),
            Some("flat".to_string())
        );
        assert_eq!(tab_name_from_disposition(None), None);
    }
}
