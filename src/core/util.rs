//! Generic string helpers used across core modules.

/// Longest prefix of `s` holding at most `max_chars` characters.
/// Never splits a multi-byte character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}

/// Short single-line preview for logs: at most `max_chars` characters,
/// with `...` appended when cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    let head = truncate_chars(s, max_chars);
    let mut out = head.replace(['\n', '\r'], " ");
    if head.len() < s.len() {
        out.push_str("...");
    }
    out
}
