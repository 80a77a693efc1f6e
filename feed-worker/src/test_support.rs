//! Fixtures shared by unit tests: feed payload builders and in-memory
//! implementations of the network seams.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{DispatchError, FetchError};
use crate::feed::FeedSource;
use crate::notify::{Notifier, WebhookPayload};

/// One entry block as the forum's Atom feed renders it, without the
/// surrounding `<entry>` tags.
pub fn entry_block(id: &str, title: &str, link: &str) -> String {
    format!(
        "<author><name>/u/poster</name><uri>https://www.reddit.com/user/poster</uri></author>\
         <content type=\"html\">&lt;!-- SC_OFF --&gt;&lt;div class=&quot;md&quot;&gt;&lt;/div&gt;\
         &lt;!-- SC_ON --&gt; submitted by &lt;a href=&quot;https://www.reddit.com/user/poster&quot;&gt; /u/poster \
         &lt;/a&gt; &lt;br/&gt; &lt;span&gt;&lt;a href=&quot;{link}&quot;&gt;[link]&lt;/a&gt;&lt;/span&gt;</content>\
         <id>{id}</id><link href=\"https://www.reddit.com/r/rust/comments/{id}/\" />\
         <updated>2024-05-01T12:00:00+00:00</updated><title>{title}</title>"
    )
}

/// A full feed document wrapping `blocks`, first block being the pinned post.
pub fn feed_payload(blocks: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><feed xmlns=\"http://www.w3.org/2005/Atom\">\
         <category term=\"rust\" label=\"r/rust\"/><updated>2024-05-01T12:00:00+00:00</updated>\
         <id>/r/rust/new/.rss</id><subtitle>A place for all things Rust</subtitle>\
         <title>newest submissions : rust</title><entry>{}</entry></feed>",
        blocks.join("</entry><entry>")
    )
}

type Script = dyn Fn(usize) -> Result<String, FetchError> + Send + Sync;

/// Feed source answering from a closure of the fetch count.
#[derive(Clone)]
pub struct ScriptedFeed {
    fetches: Arc<AtomicUsize>,
    script: Arc<Script>,
}

impl ScriptedFeed {
    pub fn from_fn<F>(script: F) -> Self
    where
        F: Fn(usize) -> Result<String, FetchError> + Send + Sync + 'static,
    {
        Self {
            fetches: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(script),
        }
    }

    pub fn fixed(payload: String) -> Self {
        Self::from_fn(move |_| Ok(payload.clone()))
    }

    pub fn failing(status: u16) -> Self {
        Self::from_fn(move |_| Err(FetchError::Status(status)))
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl FeedSource for ScriptedFeed {
    async fn fetch(&self) -> Result<String, FetchError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst);
        (self.script)(n)
    }
}

/// Notifier that records every payload and rejects chosen titles.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<WebhookPayload>>>,
    fail_titles: Arc<HashSet<String>>,
}

impl RecordingNotifier {
    pub fn failing_on(titles: &[&str]) -> Self {
        Self {
            sent: Arc::default(),
            fail_titles: Arc::new(titles.iter().map(|t| t.to_string()).collect()),
        }
    }

    pub fn sent(&self) -> Vec<WebhookPayload> {
        self.sent.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent()
            .iter()
            .flat_map(|p| p.embeds.iter().map(|e| e.title.clone()))
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, payload: &WebhookPayload) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push(payload.clone());

        let rejected = payload
            .embeds
            .iter()
            .any(|e| self.fail_titles.contains(&e.title));
        if rejected {
            Err(DispatchError::Status(500))
        } else {
            Ok(())
        }
    }
}
