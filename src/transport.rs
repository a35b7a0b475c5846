use crate::error::TransportError;
use async_trait::async_trait;

/// "POST this JSON body to this URL" capability used by the dispatcher.
///
/// Implementations own connection handling, TLS and timeouts. They must
/// not retry: a failed call is reported once and dropped.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Send `body` to `url` with `Content-Type: application/json`.
    ///
    /// **Returns**
    /// - `Ok(())` if the endpoint answered with a 2xx status.
    /// - `Err(TransportError::Rejected)` for any other status.
    /// - `Err(TransportError::Request)` if no response was received.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<(), TransportError>;
}

#[cfg(feature = "reqwest-transport")]
pub use self::reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport {
    use super::WebhookTransport;
    use crate::error::TransportError;
    use async_trait::async_trait;
    use reqwest::Client;
    use std::time::Duration;

    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// [`WebhookTransport`] backed by a shared `reqwest` client.
    #[derive(Clone, Debug)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Result<Self, TransportError> {
            Self::with_timeout(DEFAULT_TIMEOUT)
        }

        pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| TransportError::Request(e.to_string()))?;
            Ok(Self { client })
        }

        /// Reuse an existing client and its connection pool.
        pub fn from_client(client: Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl WebhookTransport for ReqwestTransport {
        async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<(), TransportError> {
            let resp = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;

            if resp.status().is_success() {
                tracing::debug!(status = %resp.status(), "webhook accepted message");
                Ok(())
            } else {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
                tracing::warn!(status = %status, "webhook rejected message");
                Err(TransportError::Rejected { status: status.as_u16(), body: text })
            }
        }
    }
}
