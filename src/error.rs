use thiserror::Error;

/// Failure while delivering a payload to a single webhook URL.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// The destination answered with a non-success status.
    #[error("webhook rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Error type returned by the builder, the dispatcher and the sink.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("extra field `{field}` could not be serialized: {source}")]
    Serialization {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// At least one destination failed. `first_url` and `first_error`
    /// describe the earliest failure in dispatch order.
    #[error("{failed} of {attempted} webhook deliveries failed; first failure for {first_url}: {first_error}")]
    Delivery {
        failed: usize,
        attempted: usize,
        first_url: String,
        first_error: TransportError,
    },
}

impl NotifyError {
    pub(crate) fn no_destination() -> Self {
        NotifyError::Configuration("no destination configured".to_string())
    }
}
