use std::path::Path;
use time::OffsetDateTime;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape HTML attribute values
pub fn escape_attr(text: &str) -> String {
    escape_html(text)
}

/// Generate last modified metadata HTML
pub fn last_modified_html(path: &Path) -> String {
    let Ok(mtime) = std::fs::metadata(path).and_then(|m| m.modified()) else {
        return String::new();
    };
    let Ok(dur) = mtime.duration_since(std::time::UNIX_EPOCH) else {
        return String::new();
    };
    let Ok(dt) = OffsetDateTime::from_unix_timestamp(dur.as_secs() as i64) else {
        return String::new();
    };
    match dt.format(&time::format_description::well_known::Rfc3339) {
        Ok(s) => format!("<p class=\"meta\">Last modified: {}</p>", escape_html(&s)),
        Err(_) => String::new(),
    }
}
