//! FeedMe - forwards new forum feed entries to a webhook.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler → PollCycle → FeedSource (GET) → extract_entries → SeenStore → Dispatcher → Notifier (POST)
//! ```
//!
//! A single scheduler task owns the poll cycle, so the seen store always has
//! exactly one reader and writer.

pub mod config;
pub mod error;
pub mod feed;
pub mod notify;
pub mod poll;
pub mod scheduler;
pub mod store;
pub mod util;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, CycleError, DispatchError, FetchError, StoreError};
pub use feed::{extract_entries, Entry, FeedSource, HttpFeedSource};
pub use notify::{DispatchReport, Dispatcher, Notifier, WebhookNotifier, WebhookPayload};
pub use poll::{CycleSummary, PollCycle};
pub use scheduler::{Scheduler, SchedulerHandle};
pub use store::{SeenSet, SeenStore, SEEN_CAPACITY};
