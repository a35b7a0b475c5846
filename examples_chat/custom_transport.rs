use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};
use google_chat_log_sink::{
    init::{init_tracing_with_config, LayerConfig},
    transport::WebhookTransport,
    GoogleChatSink, NotificationConfig, Severity, TransportError,
};

/// Example of plugging in a completely custom transport by implementing
/// `WebhookTransport` directly. Imagine this goes through a corporate
/// egress proxy client; here it just prints the payload.
struct StdoutTransport;

#[async_trait]
impl WebhookTransport for StdoutTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<(), TransportError> {
        println!("[{}] {}", url, body);
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let config = NotificationConfig::new("https://chat.example/space-a,https://chat.example/space-b")
        .with_level_mentions(Severity::Warning, "ops-oncall")
        .with_application("custom-transport-demo", None);
    let sink = GoogleChatSink::new(config, Arc::new(StdoutTransport));

    let layer_config = LayerConfig {
        min_level: tracing::Level::WARN,
        enable_stdout: false,
        ..LayerConfig::default()
    };
    init_tracing_with_config(Arc::new(sink), layer_config).expect("install subscriber");

    warn!(queue_depth = 1200, "queue is backing up");
    error!(severity = "alert", "queue consumer crashed");

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
}
