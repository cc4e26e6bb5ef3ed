//! Folding of join fan-out.
//!
//! A join against a one-to-many table yields several physical rows per logical
//! record. [`normalize`] collapses them: rows are addressed by the value of the
//! key column, and each column keeps its first value with later, not yet seen
//! values appended after a comma.
//!
//! "Not yet seen" is a case-insensitive substring test against what has been
//! collected so far, so a value that happens to be contained in an earlier one
//! (`"1"` after `"21"`) is dropped as well.

use indexmap::IndexMap;

use crate::value::Row;

/// Column name → folded value.
pub type Record = IndexMap<String, String>;
/// Key column value → folded record, in order of first appearance.
pub type Records = IndexMap<String, Record>;

const KEY_MARKER: &str = "Id";

/// First column whose name contains `Id` (case-sensitive).
pub fn key_column(columns: &[String]) -> Option<&str> {
    columns
        .iter()
        .map(String::as_str)
        .find(|name| name.contains(KEY_MARKER))
}

fn already_collected(existing: &str, candidate: &str) -> bool {
    existing.to_lowercase().contains(&candidate.to_lowercase())
}

/// `None` for an empty result. Without a key column every row lands in the
/// record keyed by the empty string.
pub fn normalize(rows: &[Row]) -> Option<Records> {
    let first = rows.first()?;
    let key = key_column(first.columns()).map(str::to_owned);
    let mut records = Records::new();
    for row in rows {
        let address = key
            .as_deref()
            .and_then(|k| row.get(k))
            .map(ToString::to_string)
            .unwrap_or_default();
        let record = records.entry(address).or_default();
        for (column, value) in row.iter() {
            let value = value.to_string();
            match record.get_mut(column) {
                None => {
                    record.insert(column.to_owned(), value);
                }
                Some(existing) => {
                    if !already_collected(existing, &value) {
                        existing.push(',');
                        existing.push_str(&value);
                    }
                }
            }
        }
    }
    Some(records)
}
