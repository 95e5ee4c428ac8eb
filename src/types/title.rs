use std::fmt;

use crate::errors::WikiError;

/// A validated page identifier.
///
/// Only ASCII letters and digits are accepted and the title may not be
/// empty. Titles therefore never contain `/` or `.`, which keeps every page
/// file inside the storage directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Title(String);

impl Title {
    /// Validate a raw path segment, rejecting anything outside `[a-zA-Z0-9]+`
    pub fn parse(raw: &str) -> Result<Self, WikiError> {
        if is_valid_title(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(WikiError::NotFound)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check a candidate title against the `[a-zA-Z0-9]+` character class
pub fn is_valid_title(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
