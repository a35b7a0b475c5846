use crate::config::{parse_webhook_urls, CardSchema, NotificationConfig};
use crate::record::Severity;

/// Environment variable names used by this crate for convenient
/// configuration of the Google Chat sink from services.
///
/// These are purely helpers; the core builder and dispatcher only ever see
/// a [`NotificationConfig`] value.

/// One or more webhook URLs, comma separated.
pub const GOOGLE_CHAT_WEBHOOK_URL_ENV: &str = "GOOGLE_CHAT_WEBHOOK_URL";

/// User ids mentioned for every severity.
pub const GOOGLE_CHAT_NOTIFY_DEFAULT_ENV: &str = "GOOGLE_CHAT_NOTIFY_DEFAULT";

/// Prefix of the per-severity mention variables, e.g.
/// `GOOGLE_CHAT_NOTIFY_ERROR`, `GOOGLE_CHAT_NOTIFY_CRITICAL`.
pub const GOOGLE_CHAT_NOTIFY_PREFIX: &str = "GOOGLE_CHAT_NOTIFY_";

/// `cards_v2` (default) or `legacy`.
pub const GOOGLE_CHAT_SCHEMA_ENV: &str = "GOOGLE_CHAT_SCHEMA";

/// Deployment environment shown on the card (`production`, `staging`).
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Application name used as the card subtitle.
pub const APP_NAME_ENV: &str = "APP_NAME";

/// Application URL shown on the card.
pub const APP_URL_ENV: &str = "APP_URL";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Name of the mention variable for `level`.
pub fn level_mentions_key(level: Severity) -> String {
    format!("{}{}", GOOGLE_CHAT_NOTIFY_PREFIX, level.as_str().to_ascii_uppercase())
}

impl NotificationConfig {
    /// Load settings from the process environment.
    ///
    /// Missing variables leave the matching field at its default. An empty
    /// webhook list is accepted here and reported when sending.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mentions_by_level = Severity::ALL
            .into_iter()
            .filter_map(|level| non_empty(&level_mentions_key(level)).map(|spec| (level, spec)))
            .collect();

        let schema = non_empty(GOOGLE_CHAT_SCHEMA_ENV)
            .and_then(|s| s.parse::<CardSchema>().ok())
            .unwrap_or_default();

        NotificationConfig {
            webhook_urls: lookup(GOOGLE_CHAT_WEBHOOK_URL_ENV)
                .map(|raw| parse_webhook_urls(&raw))
                .unwrap_or_default(),
            mentions_by_level,
            default_mentions: lookup(GOOGLE_CHAT_NOTIFY_DEFAULT_ENV).unwrap_or_default(),
            environment_name: non_empty(APP_ENV_ENV),
            application_name: non_empty(APP_NAME_ENV),
            application_url: non_empty(APP_URL_ENV),
            schema,
        }
    }
}
