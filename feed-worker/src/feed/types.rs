//! Type definitions for extracted feed entries.

/// One post extracted from a feed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Stable identifier of the post, used for de-duplication
    pub id: String,
    /// Display title, not yet truncated
    pub title: String,
    /// Outbound link carried by the post; empty when the post has none
    pub external_url: String,
}

impl Entry {
    /// Create a new entry.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        external_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            external_url: external_url.into(),
        }
    }
}
