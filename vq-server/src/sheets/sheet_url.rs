//! Spreadsheet identifier extraction from user-supplied URLs

/// Extract the opaque spreadsheet id from a sheet URL
///
/// The id is the first non-empty run of `[A-Za-z0-9_-]` following a
/// `/d/` marker. Returns `None` when no such segment exists.
pub fn extract_sheet_id(url: &str) -> Option<&str> {
    let mut rest = url;
    while let Some(pos) = rest.find("/d/") {
        let candidate = &rest[pos + 3..];
        let end = candidate
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(candidate.len());
        if end > 0 {
            return Some(&candidate[..end]);
        }
        rest = candidate;
    }
    None
}
