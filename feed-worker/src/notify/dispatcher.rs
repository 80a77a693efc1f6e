//! Sequential, rate-limited delivery of new entries.
//!
//! Entries go out one at a time in the order given, with a fixed pause
//! between consecutive sends so the endpoint's rate limit is never hit. A
//! failed send is logged and the batch carries on; nothing is retried here.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use super::types::WebhookPayload;
use super::webhook::Notifier;
use crate::feed::Entry;

/// Pause between two consecutive webhook sends.
pub const DISPATCH_DELAY: Duration = Duration::from_secs(5);

/// Outcome of one dispatch batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Entries the endpoint accepted
    pub sent: usize,
    /// Entries that failed to deliver
    pub failed: usize,
}

/// Sends one notification per entry through a [`Notifier`].
#[derive(Debug)]
pub struct Dispatcher<N> {
    notifier: N,
    delay: Duration,
}

impl<N: Notifier> Dispatcher<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            delay: DISPATCH_DELAY,
        }
    }

    /// Override the pause between sends.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Deliver `entries` in order, oldest first as supplied by the caller.
    ///
    /// The pause applies after every send except the last, whatever the
    /// outcome of the send.
    pub async fn dispatch(&self, entries: &[Entry]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for (idx, entry) in entries.iter().enumerate() {
            info!(
                entry_id = %entry.id,
                title = %entry.title,
                external_url = %entry.external_url,
                position = idx + 1,
                batch_size = entries.len(),
                "dispatch_entry"
            );

            let payload = WebhookPayload::for_entry(entry);
            match self.notifier.notify(&payload).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!(entry_id = %entry.id, error = %e, "dispatch_entry_failed");
                    report.failed += 1;
                }
            }

            if idx + 1 < entries.len() && !self.delay.is_zero() {
                sleep(self.delay).await;
            }
        }

        info!(
            sent = report.sent,
            failed = report.failed,
            "dispatch_batch_complete"
        );

        report
    }
}
