//! Truncation Utilities
//!
//! Prefix truncation that respects UTF-8 boundaries. Abstract text is
//! routinely non-ASCII (µg, ±, author names), so byte slicing is unsafe.

/// Keep at most `max_chars` characters from the start of `content`.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => &content[..end],
        None => content,
    }
}

/// Single-line preview for logs: newlines flattened, `...` appended when cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut = truncate_chars(&flat, max_chars.saturating_sub(3));
    format!("{}...", cut)
}
