use crate::record::Severity;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Wire layout expected by the destination webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardSchema {
    /// `cardsV2` with a header and decorated-text widgets.
    #[default]
    CardsV2,
    /// Older `cards` layout with plain text paragraphs.
    Legacy,
}

impl std::str::FromStr for CardSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cards_v2" | "cardsv2" | "v2" => Ok(CardSchema::CardsV2),
            "legacy" | "cards" | "v1" => Ok(CardSchema::Legacy),
            other => Err(format!("unknown card schema `{other}`")),
        }
    }
}

/// Process-wide notification settings.
///
/// Loaded once (see [`NotificationConfig::from_env`] or `serde`) and shared
/// read-only afterwards.
///
/// **Fields**
/// - `webhook_urls`: destinations, in send order. Duplicates are kept.
/// - `mentions_by_level`: comma-separated user ids per severity; `all`
///   mentions everyone.
/// - `default_mentions`: ids mentioned for every severity.
/// - `environment_name`, `application_name`, `application_url`: display
///   only.
/// - `schema`: payload layout the destinations expect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    #[serde(deserialize_with = "deserialize_webhook_urls")]
    pub webhook_urls: Vec<String>,
    pub mentions_by_level: HashMap<Severity, String>,
    pub default_mentions: String,
    pub environment_name: Option<String>,
    pub application_name: Option<String>,
    pub application_url: Option<String>,
    pub schema: CardSchema,
}

impl NotificationConfig {
    /// Config targeting the given comma-separated webhook URL(s).
    pub fn new(webhook_urls: &str) -> Self {
        NotificationConfig {
            webhook_urls: parse_webhook_urls(webhook_urls),
            ..Default::default()
        }
    }

    pub fn with_webhook_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.webhook_urls = normalize_urls(urls);
        self
    }

    pub fn with_level_mentions(mut self, level: Severity, spec: impl Into<String>) -> Self {
        self.mentions_by_level.insert(level, spec.into());
        self
    }

    pub fn with_default_mentions(mut self, spec: impl Into<String>) -> Self {
        self.default_mentions = spec.into();
        self
    }

    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment_name = Some(name.into());
        self
    }

    pub fn with_application(mut self, name: impl Into<String>, url: Option<String>) -> Self {
        self.application_name = Some(name.into());
        self.application_url = url;
        self
    }

    pub fn with_schema(mut self, schema: CardSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Raw mention spec configured for `level`, or `""`.
    pub fn level_mentions(&self, level: Severity) -> &str {
        self.mentions_by_level.get(&level).map(String::as_str).unwrap_or("")
    }
}

/// Split a comma-separated URL list, trimming entries and dropping empty ones.
pub fn parse_webhook_urls(raw: &str) -> Vec<String> {
    normalize_urls(raw.split(','))
}

fn normalize_urls<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter()
        .map(|u| u.as_ref().trim().to_string())
        .filter(|u| !u.is_empty())
        .collect()
}

fn deserialize_webhook_urls<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Urls {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Urls::deserialize(deserializer)? {
        Urls::One(raw) => parse_webhook_urls(&raw),
        Urls::Many(list) => normalize_urls(list),
    })
}
