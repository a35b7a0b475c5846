use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use google_chat_log_sink::env::{env_or, APP_ENV_ENV};
use google_chat_log_sink::init::init_tracing;
use google_chat_log_sink::{ExtraFields, GoogleChatSink};

/// Reads `GOOGLE_CHAT_WEBHOOK_URL` (and the other `GOOGLE_CHAT_*` / `APP_*`
/// variables) and posts an error card to every configured space.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = GoogleChatSink::from_env()?.with_enricher(|| {
        let mut fields = ExtraFields::new();
        fields.insert("host_name", env_or("HOSTNAME", "unknown"));
        Ok(fields)
    });
    init_tracing(Arc::new(sink))?;

    info!(env = %env_or(APP_ENV_ENV, "local"), "starting service");

    error!(
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    // Give the background task time to deliver the card.
    sleep(Duration::from_secs(2)).await;
    Ok(())
}
