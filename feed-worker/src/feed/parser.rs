//! Marker-based extraction of entries from a raw feed payload.
//!
//! The feed is not run through an XML parser: the provider's Atom output is
//! stable enough that a handful of literal markers locate every field, and a
//! malformed entry then only costs the fields it is missing.

use tracing::{debug, info, warn};

use super::types::Entry;

/// Closes the feed-level title and opens the first (pinned) entry.
const HEADER_BOUNDARY: &str = "</title><entry>";

/// Separates consecutive entries.
const ENTRY_BOUNDARY: &str = "</entry><entry>";

const ID_MARKERS: (&str, &str) = ("<id>", "</id>");

const TITLE_MARKERS: (&str, &str) = ("<title>", "</title>");

/// The outbound link is the href of the HTML-escaped anchor that follows the
/// author line inside the entry content.
const LINK_MARKERS: (&str, &str) = (
    "&lt;/a&gt; &lt;br/&gt; &lt;span&gt;&lt;a href=&quot;",
    "&quot;",
);

/// Extract entries from a feed payload, newest first.
///
/// The first entry block after the feed header is the subreddit's pinned
/// post and is never returned. A payload without the header boundary yields
/// no entries.
pub fn extract_entries(payload: &str) -> Vec<Entry> {
    let Some(header_end) = payload.find(HEADER_BOUNDARY) else {
        warn!(
            payload_length = payload.len(),
            "feed_header_boundary_missing"
        );
        return Vec::new();
    };

    let body = &payload[header_end + HEADER_BOUNDARY.len()..];

    let entries: Vec<Entry> = body
        .split(ENTRY_BOUNDARY)
        .skip(1)
        .map(parse_entry_block)
        .collect();

    info!(
        payload_length = payload.len(),
        entries_found = entries.len(),
        "feed_entries_extracted"
    );

    entries
}

/// Mine one entry block for its id, title and external link.
///
/// Missing markers degrade the affected field to an empty string.
pub fn parse_entry_block(block: &str) -> Entry {
    let entry = Entry::new(
        between(block, ID_MARKERS.0, ID_MARKERS.1),
        between(block, TITLE_MARKERS.0, TITLE_MARKERS.1),
        between(block, LINK_MARKERS.0, LINK_MARKERS.1),
    );

    if entry.id.is_empty() || entry.title.is_empty() {
        debug!(
            block_length = block.len(),
            has_id = !entry.id.is_empty(),
            has_title = !entry.title.is_empty(),
            "feed_entry_incomplete"
        );
    }

    entry
}

/// Text strictly between the first `start` marker and the next `end` marker
/// after it, or `""` when either is absent.
pub fn between<'a>(source: &'a str, start: &str, end: &str) -> &'a str {
    let Some(open) = source.find(start) else {
        return "";
    };
    let rest = &source[open + start.len()..];

    match rest.find(end) {
        Some(close) => &rest[..close],
        None => "",
    }
}
