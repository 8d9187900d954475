//! Row normalization and cross-tab de-duplication

use std::collections::HashSet;

use vq_common::db::models::NewSong;

use super::csv::parse_csv_row;

/// Raw CSV lines fetched from one tab
#[derive(Debug, Clone)]
pub struct TabRows {
    pub tab_name: String,
    pub lines: Vec<String>,
}

/// Convert fetched tabs into canonical songs
///
/// Per tab: the first line is the header and is skipped; rows whose first
/// column trims to empty contribute nothing. Title is column 0, artist is
/// column 1 (or "Unknown"), genre is the tab name. Duplicates collapse on
/// the case-insensitive title+artist key, first occurrence wins in
/// tab-then-row order; output preserves insertion order.
pub fn normalize(tabs: &[TabRows]) -> Vec<NewSong> {
    let mut seen = HashSet::new();
    let mut songs = Vec::new();

    for tab in tabs {
        for line in tab.lines.iter().skip(1) {
            if let Some(song) = song_from_line(line, &mut seen, |_| Some(tab.tab_name.clone())) {
                songs.push(song);
            }
        }
    }
    songs
}

/// Fallback single-sheet mode: no tabs were discoverable, so the default
/// export is parsed with column 2 as an explicit genre value
pub fn normalize_single_sheet(lines: &[String]) -> Vec<NewSong> {
    let mut seen = HashSet::new();
    let mut songs = Vec::new();

    for line in lines.iter().skip(1) {
        let song = song_from_line(line, &mut seen, |cols| {
            cols.get(2)
                .map(|g| g.trim())
                .filter(|g| !g.is_empty())
                .map(|g| g.to_string())
        });
        if let Some(song) = song {
            songs.push(song);
        }
    }
    songs
}

fn song_from_line(
    line: &str,
    seen: &mut HashSet<String>,
    genre_of: impl Fn(&[String]) -> Option<String>,
) -> Option<NewSong> {
    let cols = parse_csv_row(line);

    let title = cols.first().map(|c| c.trim()).unwrap_or("");
    if title.is_empty() {
        return None;
    }

    let artist = cols
        .get(1)
        .map(|c| c.trim())
        .filter(|a| !a.is_empty())
        .unwrap_or("Unknown");

    let key = format!("{}|||{}", title, artist).to_lowercase();
    if !seen.insert(key) {
        return None;
    }

    Some(NewSong {
        title: title.to_string(),
        artist: artist.to_string(),
        genre: genre_of(&cols),
        is_available: true,
    })
}
