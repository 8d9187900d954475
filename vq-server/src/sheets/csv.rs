//! CSV row tokenizer for spreadsheet exports
//!
//! Deliberately permissive: a quote character toggles quoted state rather
//! than following RFC 4180 escaping, so malformed quoting degrades into
//! slightly odd fields instead of a parse failure. This matches the
//! behavior of the export surface being consumed.

/// Tokenize one CSV line into field values, honoring quoted fields that
/// may contain the delimiter. Always returns at least one field.
pub fn parse_csv_row(row: &str) -> Vec<String> {
    let mut cols = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in row.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cols.push(finish_field(&current));
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    cols.push(finish_field(&current));
    cols
}

/// Trim surrounding whitespace, then strip at most one leading and one
/// trailing quote that survived the toggle scan
fn finish_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let stripped = stripped.strip_suffix('"').unwrap_or(stripped);
    stripped.to_string()
}
