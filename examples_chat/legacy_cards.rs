use std::sync::Arc;

use google_chat_log_sink::transport::ReqwestTransport;
use google_chat_log_sink::{
    CardSchema, ExtraFields, GoogleChatSink, LogRecord, NotificationConfig, Severity,
};

/// Sends one record directly, without the tracing layer, using the
/// older `cards` layout.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::var("GOOGLE_CHAT_WEBHOOK_URL")?;
    let config = NotificationConfig::new(&url)
        .with_schema(CardSchema::Legacy)
        .with_default_mentions("all")
        .with_environment("staging");

    let sink = GoogleChatSink::new(config, Arc::new(ReqwestTransport::new()?));

    let mut extra = ExtraFields::new();
    extra.insert_serialize("retry_count", &3)?;
    extra.insert_serialize("last_error", &serde_json::json!({"code": 503}))?;
    let record = LogRecord::new(Severity::Critical, "payment gateway unreachable").with_extra(extra);

    for outcome in sink.notify(&record).await? {
        match outcome.result {
            Ok(()) => println!("delivered"),
            Err(e) => println!("delivery failed: {}", e),
        }
    }
    Ok(())
}
