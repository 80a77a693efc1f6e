//! Webhook notifications for new entries.
//!
//! ```text
//! Vec<Entry> (oldest first) → Dispatcher::dispatch() → WebhookPayload → Notifier::notify()
//! ```

pub mod dispatcher;
pub mod types;
pub mod webhook;

pub use dispatcher::{DispatchReport, Dispatcher, DISPATCH_DELAY};
pub use types::{Embed, WebhookPayload, MAX_TITLE_CHARS};
pub use webhook::{Notifier, WebhookNotifier};
