//! Feed retrieval and entry extraction.
//!
//! ```text
//! HttpFeedSource::fetch() → raw payload → extract_entries() → Vec<Entry> (newest first)
//! ```

pub mod parser;
pub mod source;
pub mod types;

pub use parser::{extract_entries, parse_entry_block};
pub use source::{FeedSource, HttpFeedSource};
pub use types::Entry;
