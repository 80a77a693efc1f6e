//! Delivery of a single payload to the webhook endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{error, info};
use url::Url;

use super::types::WebhookPayload;
use crate::error::DispatchError;

/// Anything that can deliver one notification.
pub trait Notifier: Send + Sync {
    /// Deliver `payload`, succeeding only if the endpoint accepted it.
    fn notify(
        &self,
        payload: &WebhookPayload,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

/// POSTs payloads as JSON to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &WebhookPayload) -> Result<(), DispatchError> {
        let body = serde_json::to_vec(payload).map_err(|e| {
            error!(error = %e, "webhook_payload_serialize_failed");
            DispatchError::Serialize(e)
        })?;

        let response = self
            .client
            .post(self.url.clone())
            .timeout(self.timeout)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(
                        timeout_seconds = self.timeout.as_secs_f64(),
                        error = %e,
                        "webhook_post_timeout"
                    );
                } else {
                    error!(error = %e, "webhook_post_error");
                }
                DispatchError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status_code = status.as_u16(), "webhook_post_rejected");
            return Err(DispatchError::Status(status.as_u16()));
        }

        info!(status_code = status.as_u16(), "webhook_post_complete");
        Ok(())
    }
}
