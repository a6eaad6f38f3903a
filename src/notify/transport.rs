use std::time::Duration;

use reqwest::{Client, Url};
use tracing::debug;

use super::error::NotifyError;
use super::payload::MultipartPayload;
use super::types::DeliveryResult;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends one payload in a single POST. Implementations never retry.
pub trait PayloadSender {
    async fn send(&self, payload: MultipartPayload, endpoint: &Url, token: &str)
    -> DeliveryResult;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, NotifyError> {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport whose requests abort after `request_timeout`.
    pub fn with_timeouts(
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn post(
        &self,
        payload: MultipartPayload,
        endpoint: &Url,
        token: &str,
    ) -> Result<u16, NotifyError> {
        let form = payload.into_form()?;
        let response = self
            .client
            .post(endpoint.clone())
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %body, "server rejected notification");
        Err(NotifyError::ServerRejection {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }
}

impl PayloadSender for HttpTransport {
    async fn send(
        &self,
        payload: MultipartPayload,
        endpoint: &Url,
        token: &str,
    ) -> DeliveryResult {
        match self.post(payload, endpoint, token).await {
            Ok(code) => DeliveryResult::delivered(code),
            Err(e) => DeliveryResult::failed(&e),
        }
    }
}
