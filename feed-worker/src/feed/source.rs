//! Retrieval of the raw feed payload.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::{error, info};
use url::Url;

use crate::error::FetchError;
use crate::util::user_agent::{build_headers, pick_user_agent};

/// Anything that can hand back the current feed payload as text.
pub trait FeedSource: Send + Sync {
    /// Fetch the feed once.
    fn fetch(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches the feed over HTTP with a browser-like header set.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
    url: Url,
    timeout: Duration,
    user_agent_pool: Option<Vec<String>>,
}

impl HttpFeedSource {
    /// Create a new feed source sharing the given client.
    pub fn new(
        client: Client,
        url: Url,
        timeout: Duration,
        user_agent_pool: Option<Vec<String>>,
    ) -> Self {
        Self {
            client,
            url,
            timeout,
            user_agent_pool,
        }
    }
}

impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let user_agent = pick_user_agent(self.user_agent_pool.as_deref());
        let headers = build_headers(&user_agent);

        info!(
            url = %self.url,
            timeout_seconds = self.timeout.as_secs_f64(),
            "feed_fetch_starting"
        );

        let mut request = self.client.get(self.url.clone()).timeout(self.timeout);
        for (key, value) in &headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                error!(url = %self.url, error = %e, "feed_fetch_timeout");
            } else {
                error!(url = %self.url, error = %e, "feed_fetch_error");
            }
            FetchError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(
                url = %self.url,
                status_code = status.as_u16(),
                "feed_fetch_rejected"
            );
            return Err(FetchError::Status(status.as_u16()));
        }

        // Decoded as UTF-8 regardless of the advertised charset.
        let bytes = response.bytes().await.map_err(FetchError::Body)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        info!(
            url = %self.url,
            status_code = status.as_u16(),
            body_length = body.len(),
            "feed_fetch_complete"
        );

        Ok(body)
    }
}
