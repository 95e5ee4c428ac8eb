use std::sync::OnceLock;

use regex::Regex;

use crate::utils::escape_html;

fn link_regex() -> &'static Regex {
    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    LINK_REGEX.get_or_init(|| Regex::new(r"\[([a-zA-Z0-9]+)\]").expect("Invalid link regex"))
}

/// Service turning raw page bodies into safe HTML with bracket links
pub struct MarkupService;

impl MarkupService {
    /// Create a new markup service
    pub fn new() -> Self {
        Self
    }

    /// Escape the body, then replace every `[Title]` with a link to its view page.
    ///
    /// Escaping runs first so the inserted anchors are never escaped and no
    /// user-supplied markup survives.
    pub fn render(&self, body: &[u8]) -> String {
        let escaped = escape_html(&String::from_utf8_lossy(body));
        link_regex()
            .replace_all(&escaped, "<a href=\"/view/${1}\">${1}</a>")
            .into_owned()
    }

    /// Titles referenced by bracket links, in order of appearance
    pub fn linked_titles(&self, body: &[u8]) -> Vec<String> {
        let text = String::from_utf8_lossy(body);
        link_regex()
            .captures_iter(&text)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

impl Default for MarkupService {
    fn default() -> Self {
        Self::new()
    }
}
