use crate::card::RenderedPayload;
use crate::error::{NotifyError, TransportError};
use crate::transport::WebhookTransport;

/// Result of delivering one payload to one URL.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub url: String,
    pub result: Result<(), TransportError>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcomes that carry an error, in dispatch order.
pub fn failures(outcomes: &[DispatchOutcome]) -> impl Iterator<Item = &DispatchOutcome> {
    outcomes.iter().filter(|o| !o.is_success())
}

/// Send `payload` to every URL in `urls`.
///
/// URLs are tried in order, duplicates included. A failing destination does
/// not stop the remaining ones, and nothing is retried.
///
/// **Returns**
/// - `Err(NotifyError::Configuration)` if `urls` is empty. The transport is
///   never called in that case.
/// - `Ok(outcomes)` with one entry per URL otherwise, even when some or all
///   deliveries failed.
pub async fn dispatch<S: AsRef<str>>(
    payload: &RenderedPayload,
    urls: &[S],
    transport: &dyn WebhookTransport,
) -> Result<Vec<DispatchOutcome>, NotifyError> {
    if urls.is_empty() {
        return Err(NotifyError::no_destination());
    }

    let body = payload
        .to_json()
        .map_err(|source| NotifyError::Serialization { field: "payload".to_string(), source })?;

    let mut outcomes = Vec::with_capacity(urls.len());
    for (index, url) in urls.iter().enumerate() {
        let url = url.as_ref();
        // URLs carry the webhook key and token; log the position only.
        tracing::debug!(destination = index, "posting message to webhook");
        let result = transport.post_json(url, &body).await;
        outcomes.push(DispatchOutcome { url: url.to_string(), result });
    }
    Ok(outcomes)
}
