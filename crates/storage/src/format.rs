//! On-disk line format.
//!
//! A log file is its entries joined by [`SEPARATOR`], with no trailing
//! separator. Zero-length content is zero entries.

/// Separator between entries
pub const SEPARATOR: char = '\n';

/// Split file content into entries.
///
/// Empty content yields an empty list, never a single empty entry.
pub fn split_entries(content: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }
    content.split(SEPARATOR).map(String::from).collect()
}

/// Join entries into file content.
pub fn join_entries<S: AsRef<str>>(entries: &[S]) -> String {
    let capacity = entries.iter().map(|e| e.as_ref().len() + 1).sum();
    let mut out = String::with_capacity(capacity);
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(entry.as_ref());
    }
    out
}
