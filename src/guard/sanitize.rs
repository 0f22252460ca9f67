//! Text Sanitization Module
//!
//! Escaping, whitespace folding and entity-safe truncation. Every function
//! here is total: bad input is degraded, never rejected.

/// Entities produced by [`escape_html`]. An `&` that already starts one of
/// these is kept as-is, which makes escaping idempotent.
const KNOWN_ENTITIES: &[&str] = &["&amp;", "&lt;", "&gt;", "&quot;", "&#x27;"];

/// HTML-escapes `& < > " '`, leaving existing known entities untouched.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' if starts_with_entity(&text[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn starts_with_entity(text: &str) -> bool {
    KNOWN_ENTITIES.iter().any(|entity| text.starts_with(entity))
}

/// Collapses every run of whitespace into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max_chars` characters without leaving a partial
/// entity or trailing whitespace behind.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(max_chars).collect();
    if let Some(amp) = cut.rfind('&') {
        if !cut[amp..].contains(';') {
            cut.truncate(amp);
        }
    }
    cut.trim_end().to_string()
}

/// Full command sanitization: trim, drop NUL bytes, escape, collapse
/// whitespace, then hard-truncate.
pub fn sanitize_text(text: &str, max_chars: usize) -> String {
    let without_nul: String = text.trim().chars().filter(|c| *c != '\0').collect();
    let escaped = escape_html(&without_nul);
    let collapsed = collapse_whitespace(&escaped);
    truncate_chars(&collapsed, max_chars)
}
