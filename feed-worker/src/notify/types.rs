//! Webhook message format.
//!
//! The endpoint accepts a JSON object with an `embeds` array; each embed
//! renders as one card with a title and free-text description.

use serde::{Deserialize, Serialize};

use crate::feed::Entry;

/// Longest title the webhook accepts, in characters.
pub const MAX_TITLE_CHARS: usize = 256;

/// Body POSTed to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

/// One notification card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
}

impl WebhookPayload {
    /// Build the single-embed notification for a feed entry.
    pub fn for_entry(entry: &Entry) -> Self {
        Self {
            embeds: vec![Embed {
                title: truncate_chars(&entry.title, MAX_TITLE_CHARS).to_string(),
                description: entry.external_url.clone(),
            }],
        }
    }
}

/// Hard cut after `max` characters; never splits a UTF-8 sequence.
pub fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => &value[..byte_idx],
        None => value,
    }
}
