//! One fetch → extract → filter → record → dispatch pass.
//!
//! New ids are written to the seen store *before* any notification goes
//! out. A crash mid-batch can therefore drop the notifications not yet sent,
//! but never sends the same entry twice.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::CycleError;
use crate::feed::{extract_entries, Entry, FeedSource};
use crate::notify::{DispatchReport, Dispatcher, Notifier};
use crate::store::{SeenSet, SeenStore, SEEN_CAPACITY};

/// Result of a completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Entries extracted from the feed, pinned post excluded
    pub entries_found: usize,
    /// Entries not previously seen
    pub new_entries: usize,
    /// Delivery outcome for the new entries
    pub report: DispatchReport,
}

/// Owns everything a cycle touches.
#[derive(Debug)]
pub struct PollCycle<F, N> {
    source: F,
    store: SeenStore,
    dispatcher: Dispatcher<N>,
}

impl<F: FeedSource, N: Notifier> PollCycle<F, N> {
    pub fn new(source: F, store: SeenStore, dispatcher: Dispatcher<N>) -> Self {
        Self {
            source,
            store,
            dispatcher,
        }
    }

    pub fn store(&self) -> &SeenStore {
        &self.store
    }

    /// Run the cycle once.
    ///
    /// Fetch and store failures abort before anything is dispatched.
    /// Individual delivery failures are counted in the summary instead.
    pub async fn run(&self) -> Result<CycleSummary, CycleError> {
        let payload = self.source.fetch().await?;
        let mut entries = extract_entries(&payload);
        let entries_found = entries.len();

        // Only as many entries as the store can remember are considered;
        // anything older would be forgotten and re-sent on every cycle.
        if entries.len() > SEEN_CAPACITY {
            warn!(
                entries_found,
                entries_dropped = entries.len() - SEEN_CAPACITY,
                capacity = SEEN_CAPACITY,
                "poll_entries_beyond_capacity_dropped"
            );
            entries.truncate(SEEN_CAPACITY);
        }

        let seen = self.store.load().await?;
        let fresh = select_new_entries(entries, &seen);

        info!(
            entries_found,
            seen_ids = seen.len(),
            new_entries = fresh.len(),
            "poll_cycle_filtered"
        );

        if fresh.is_empty() {
            return Ok(CycleSummary {
                entries_found,
                ..CycleSummary::default()
            });
        }

        let new_ids: Vec<String> = fresh.iter().map(|e| e.id.clone()).collect();
        self.store.record_and_prune(&new_ids, seen.ids()).await?;

        // Feed order is newest first; notifications go out in publication order.
        let chronological: Vec<Entry> = fresh.into_iter().rev().collect();
        let report = self.dispatcher.dispatch(&chronological).await;

        Ok(CycleSummary {
            entries_found,
            new_entries: chronological.len(),
            report,
        })
    }
}

/// Keep entries not in `seen`, preserving feed order.
///
/// Entries without an id cannot be remembered and are skipped; repeated ids
/// within one response keep their first occurrence.
pub fn select_new_entries(entries: Vec<Entry>, seen: &SeenSet) -> Vec<Entry> {
    let mut batch_ids = HashSet::new();

    entries
        .into_iter()
        .filter(|entry| {
            if entry.id.is_empty() {
                warn!(title = %entry.title, "poll_entry_without_id_skipped");
                return false;
            }
            !seen.contains(&entry.id) && batch_ids.insert(entry.id.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tempfile::{tempdir, TempDir};

    use crate::error::{FetchError, StoreError};
    use crate::test_support::{entry_block, feed_payload, RecordingNotifier, ScriptedFeed};

    fn three_post_feed() -> String {
        feed_payload(&[
            entry_block("t3_pinned", "Read the rules", "https://example.com/rules"),
            entry_block("p1", "Post one", "https://example.com/1"),
            entry_block("p2", "Post two", "https://example.com/2"),
            entry_block("p3", "Post three", "https://example.com/3"),
        ])
    }

    fn cycle_in(
        dir: &TempDir,
        source: ScriptedFeed,
    ) -> (PollCycle<ScriptedFeed, RecordingNotifier>, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let dispatcher = Dispatcher::new(notifier.clone()).with_delay(Duration::ZERO);
        let store = SeenStore::new(dir.path().join("SentData.txt"));
        (PollCycle::new(source, store, dispatcher), notifier)
    }

    #[test]
    fn test_select_filters_seen_and_keeps_order() {
        let entries = vec![
            Entry::new("a", "A", ""),
            Entry::new("b", "B", ""),
            Entry::new("c", "C", ""),
        ];
        let seen = SeenSet::from_ids(["b"]);

        let fresh = select_new_entries(entries, &seen);
        let ids: Vec<_> = fresh.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_select_skips_empty_and_repeated_ids() {
        let entries = vec![
            Entry::new("a", "A", ""),
            Entry::new("", "Broken", ""),
            Entry::new("a", "A again", ""),
        ];

        let fresh = select_new_entries(entries, &SeenSet::default());
        assert_eq!(fresh, vec![Entry::new("a", "A", "")]);
    }

    #[tokio::test]
    async fn test_first_cycle_dispatches_chronologically() {
        let dir = tempdir().unwrap();
        let (cycle, notifier) = cycle_in(&dir, ScriptedFeed::fixed(three_post_feed()));

        let summary = cycle.run().await.unwrap();

        assert_eq!(summary.entries_found, 3);
        assert_eq!(summary.new_entries, 3);
        assert_eq!(summary.report.sent, 3);
        assert_eq!(notifier.titles(), vec!["Post three", "Post two", "Post one"]);

        let descriptions: Vec<_> = notifier
            .sent()
            .iter()
            .map(|p| p.embeds[0].description.clone())
            .collect();
        assert_eq!(
            descriptions,
            vec!["https://example.com/3", "https://example.com/2", "https://example.com/1"]
        );

        let seen = cycle.store().load().await.unwrap();
        assert_eq!(seen.ids(), &["p1".to_string(), "p2".to_string(), "p3".to_string()]);
    }

    #[tokio::test]
    async fn test_rerun_sends_nothing() {
        let dir = tempdir().unwrap();
        let (cycle, notifier) = cycle_in(&dir, ScriptedFeed::fixed(three_post_feed()));

        cycle.run().await.unwrap();
        let before = cycle.store().load().await.unwrap();

        let summary = cycle.run().await.unwrap();

        assert_eq!(summary.new_entries, 0);
        assert_eq!(notifier.sent().len(), 3);
        assert_eq!(cycle.store().load().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_bounded_store_keeps_newest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SentData.txt");
        let prior: Vec<String> = (0..SEEN_CAPACITY).map(|i| format!("old{i}")).collect();
        std::fs::write(&path, prior.join("\n")).unwrap();

        let (cycle, notifier) = cycle_in(&dir, ScriptedFeed::fixed(three_post_feed()));
        cycle.run().await.unwrap();

        assert_eq!(notifier.sent().len(), 3);
        let seen = cycle.store().load().await.unwrap();
        assert_eq!(seen.len(), SEEN_CAPACITY);
        for id in ["p1", "p2", "p3"] {
            assert!(seen.contains(id));
        }
        assert_eq!(&seen.ids()[3..], &prior[..22]);
    }

    fn long_feed(posts: usize) -> String {
        let mut blocks = vec![entry_block("t3_pinned", "Pinned", "")];
        for i in 0..posts {
            let id = format!("q{i}");
            blocks.push(entry_block(&id, &id, ""));
        }
        feed_payload(&blocks)
    }

    #[tokio::test]
    async fn test_feed_longer_than_store_is_not_resent() {
        let dir = tempdir().unwrap();
        let (cycle, notifier) = cycle_in(&dir, ScriptedFeed::fixed(long_feed(30)));

        let first = cycle.run().await.unwrap();
        assert_eq!(first.entries_found, 30);
        assert_eq!(first.new_entries, SEEN_CAPACITY);

        for _ in 0..3 {
            let again = cycle.run().await.unwrap();
            assert_eq!(again.new_entries, 0);
        }

        // Only the newest posts went out, oldest of them first.
        let titles = notifier.titles();
        assert_eq!(titles.len(), SEEN_CAPACITY);
        assert_eq!(titles.first().map(String::as_str), Some("q24"));
        assert_eq!(titles.last().map(String::as_str), Some("q0"));
        assert!(!titles.iter().any(|t| t == "q25" || t == "q29"));
    }

    #[tokio::test]
    async fn test_new_post_on_long_feed_sent_once() {
        let dir = tempdir().unwrap();
        let feed = ScriptedFeed::from_fn(|n| {
            let mut blocks = vec![entry_block("t3_pinned", "Pinned", "")];
            if n > 0 {
                blocks.push(entry_block("fresh", "fresh", ""));
            }
            for i in 0..30 {
                let id = format!("q{i}");
                blocks.push(entry_block(&id, &id, ""));
            }
            Ok(feed_payload(&blocks))
        });
        let (cycle, notifier) = cycle_in(&dir, feed);

        cycle.run().await.unwrap();
        let second = cycle.run().await.unwrap();
        let third = cycle.run().await.unwrap();

        assert_eq!(second.new_entries, 1);
        assert_eq!(third.new_entries, 0);
        assert_eq!(notifier.titles().last().map(String::as_str), Some("fresh"));
        assert_eq!(notifier.sent().len(), SEEN_CAPACITY + 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SentData.txt");
        std::fs::write(&path, "p9\n").unwrap();

        let (cycle, notifier) = cycle_in(&dir, ScriptedFeed::failing(503));
        let err = cycle.run().await.unwrap_err();

        assert!(matches!(err, CycleError::Fetch(FetchError::Status(503))));
        assert!(notifier.sent().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "p9\n");
    }

    #[tokio::test]
    async fn test_unreadable_store_aborts_before_dispatch() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("SentData.txt")).unwrap();

        let (cycle, notifier) = cycle_in(&dir, ScriptedFeed::fixed(three_post_feed()));
        let err = cycle.run().await.unwrap_err();

        assert!(matches!(err, CycleError::Store(StoreError::Read { .. })));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_still_records_ids() {
        let dir = tempdir().unwrap();
        let notifier = RecordingNotifier::failing_on(&["Post two"]);
        let dispatcher = Dispatcher::new(notifier.clone()).with_delay(Duration::ZERO);
        let store = SeenStore::new(dir.path().join("SentData.txt"));
        let cycle = PollCycle::new(ScriptedFeed::fixed(three_post_feed()), store, dispatcher);

        let summary = cycle.run().await.unwrap();

        assert_eq!(summary.report, DispatchReport { sent: 2, failed: 1 });
        assert!(cycle.store().contains("p2").await.unwrap());
    }

    #[tokio::test]
    async fn test_only_new_posts_dispatched() {
        let dir = tempdir().unwrap();
        let feed = ScriptedFeed::from_fn(|n| {
            let mut blocks = vec![entry_block("t3_pinned", "Pinned", "")];
            if n > 0 {
                blocks.push(entry_block("p4", "Post four", "https://example.com/4"));
            }
            blocks.push(entry_block("p1", "Post one", "https://example.com/1"));
            Ok(feed_payload(&blocks))
        });
        let (cycle, notifier) = cycle_in(&dir, feed);

        cycle.run().await.unwrap();
        cycle.run().await.unwrap();

        assert_eq!(notifier.titles(), vec!["Post one", "Post four"]);
        let seen = cycle.store().load().await.unwrap();
        assert_eq!(seen.ids(), &["p4".to_string(), "p1".to_string()]);
    }
}
