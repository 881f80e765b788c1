//! Filesystem-safe title normalization.
//!
//! This is the system's only title-equality rule: the same function
//! produces on-disk filenames and the comparison key used to match
//! user-requested titles against scraped ones.

/// Normalizes a book title into a filesystem-safe, comparison-stable key.
///
/// The title is trimmed, each run of whitespace is collapsed to a single
/// underscore, and every remaining character outside letters, digits,
/// `-`, `_`, `.` and `#` (Unicode-aware) is dropped.
///
/// The transformation is idempotent: normalizing an already-normalized
/// title returns it unchanged.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_whitespace = false;
    for ch in title.trim().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | '#') {
            out.push(ch);
        }
    }
    out
}
