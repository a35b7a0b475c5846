use crate::config::NotificationConfig;
use crate::dispatch::{dispatch, DispatchOutcome};
use crate::error::NotifyError;
use crate::message::MessageBuilder;
use crate::record::{ExtraFields, LogRecord};
use crate::sink::LogSink;
use crate::transport::WebhookTransport;
use async_trait::async_trait;
use std::sync::Arc;

/// [`LogSink`] that posts every record as a Google Chat card to all
/// configured webhooks.
#[derive(Clone)]
pub struct GoogleChatSink {
    builder: MessageBuilder,
    transport: Arc<dyn WebhookTransport>,
}

impl GoogleChatSink {
    /// Construct a sink from an already loaded configuration.
    ///
    /// **Parameters**
    /// - `config`: webhook URLs, mentions and display settings.
    /// - `transport`: HTTP capability used for every POST.
    pub fn new(config: NotificationConfig, transport: Arc<dyn WebhookTransport>) -> Self {
        GoogleChatSink {
            builder: MessageBuilder::new(Arc::new(config)),
            transport,
        }
    }

    /// Sink configured from `GOOGLE_CHAT_*` / `APP_*` environment variables,
    /// delivering with a default [`ReqwestTransport`](crate::transport::ReqwestTransport).
    #[cfg(feature = "reqwest-transport")]
    pub fn from_env() -> Result<Self, NotifyError> {
        let transport = crate::transport::ReqwestTransport::new()?;
        Ok(Self::new(NotificationConfig::from_env(), Arc::new(transport)))
    }

    /// Add an enrichment callback; see [`MessageBuilder::with_enricher`].
    pub fn with_enricher<F>(mut self, enricher: F) -> Self
    where
        F: Fn() -> Result<ExtraFields, NotifyError> + Send + Sync + 'static,
    {
        self.builder = self.builder.with_enricher(enricher);
        self
    }

    pub fn config(&self) -> &NotificationConfig {
        self.builder.config()
    }

    /// Build the payload for `record` and post it to every configured URL.
    ///
    /// **Returns**
    /// - `Err(NotifyError::Configuration)` if no webhook URL is configured.
    /// - `Err(NotifyError::Serialization)` if an extra field cannot be
    ///   rendered.
    /// - `Ok(outcomes)` otherwise, one per URL, failures included.
    pub async fn notify(&self, record: &LogRecord) -> Result<Vec<DispatchOutcome>, NotifyError> {
        let urls = &self.config().webhook_urls;
        if urls.is_empty() {
            return Err(NotifyError::no_destination());
        }
        let payload = self.builder.build(record)?;
        dispatch(&payload, urls.as_slice(), self.transport.as_ref()).await
    }
}

impl std::fmt::Debug for GoogleChatSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleChatSink")
            .field("destinations", &self.config().webhook_urls.len())
            .finish()
    }
}

#[async_trait]
impl LogSink for GoogleChatSink {
    async fn send(&self, record: &LogRecord) -> Result<(), NotifyError> {
        let outcomes = self.notify(record).await?;
        let attempted = outcomes.len();

        let mut failed = outcomes.into_iter().filter_map(|o| o.result.err().map(|e| (o.url, e)));
        let Some((first_url, first_error)) = failed.next() else {
            return Ok(());
        };

        Err(NotifyError::Delivery {
            failed: 1 + failed.count(),
            attempted,
            first_url,
            first_error,
        })
    }
}
