use crate::card::{Icon, Message, RenderedPayload, Widget};
use crate::config::NotificationConfig;
use crate::error::NotifyError;
use crate::mention::resolve_mentions;
use crate::record::{ExtraFields, ExtraValue, LogRecord, Severity};
use chrono::SecondsFormat;
use std::fmt;
use std::sync::Arc;

/// Hard limit Google Chat puts on the top-level `text` field.
pub const MAX_TEXT_CHARS: usize = 4096;

/// Environment, severity and timestamp stay visible when the card is collapsed.
const UNCOLLAPSIBLE_WIDGETS: usize = 3;

pub const COLOR_RED: &str = "#ff1100";
pub const COLOR_AMBER: &str = "#ffc400";
pub const COLOR_BLUE: &str = "#00aeff";
pub const COLOR_GREEN: &str = "#48d62f";
pub const COLOR_BLACK: &str = "#000000";

/// Callback producing extra fields for every message.
///
/// Takes no arguments; anything request-scoped has to be captured by the
/// closure itself. An error (typically from
/// [`ExtraFields::insert_serialize`]) fails the whole build.
pub type Enricher = Arc<dyn Fn() -> Result<ExtraFields, NotifyError> + Send + Sync>;

/// Font color used for the severity label.
pub fn color_for(level: Severity) -> &'static str {
    match level {
        Severity::Emergency | Severity::Alert | Severity::Critical | Severity::Error => COLOR_RED,
        Severity::Warning => COLOR_AMBER,
        Severity::Notice => COLOR_BLUE,
        Severity::Info => COLOR_GREEN,
        Severity::Debug => COLOR_BLACK,
    }
}

/// Like [`color_for`] for a raw numeric level; unknown codes are red.
pub fn color_for_code(code: u16) -> &'static str {
    Severity::from_code(code).map_or(COLOR_RED, color_for)
}

/// Builds one Google Chat payload per [`LogRecord`].
///
/// Pure: no I/O happens here. The output layout follows
/// `config.schema`.
#[derive(Clone)]
pub struct MessageBuilder {
    config: Arc<NotificationConfig>,
    enricher: Option<Enricher>,
}

impl MessageBuilder {
    pub fn new(config: Arc<NotificationConfig>) -> Self {
        MessageBuilder { config, enricher: None }
    }

    /// Install a callback whose fields are appended after the record's own
    /// extra fields.
    pub fn with_enricher<F>(mut self, enricher: F) -> Self
    where
        F: Fn() -> Result<ExtraFields, NotifyError> + Send + Sync + 'static,
    {
        self.enricher = Some(Arc::new(enricher));
        self
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Render `record` into the configured payload layout.
    ///
    /// **Returns**
    /// - `Err(NotifyError::Serialization)` naming the field if an extra field
    ///   value cannot be turned into text, including values the enricher
    ///   fails to serialize. The field is never dropped silently.
    /// - Any other error returned by the enricher, unchanged.
    ///
    /// Missing optional settings fall back to defaults.
    pub fn build(&self, record: &LogRecord) -> Result<RenderedPayload, NotifyError> {
        Ok(self.message(record)?.render(self.config.schema))
    }

    /// Schema-neutral form of [`MessageBuilder::build`].
    pub fn message(&self, record: &LogRecord) -> Result<Message, NotifyError> {
        let config = &*self.config;

        let mention_prefix = resolve_mentions(record.level, config);
        let text = truncate_chars(format!("{mention_prefix}{}", record.formatted), MAX_TEXT_CHARS);

        let mut widgets = vec![
            Widget::new(Icon::Bookmark, environment_badge(config.environment_name.as_deref())),
            Widget::new(Icon::Ticket, severity_label(record)),
            Widget::new(
                Icon::Clock,
                record.timestamp.to_rfc3339_opts(SecondsFormat::Micros, false),
            ),
        ];
        if let Some(url) = config.application_url.as_deref().filter(|u| !u.is_empty()) {
            widgets.push(Widget::new(Icon::Bus, url));
        }

        extra_widgets(&record.extra, &mut widgets)?;
        if let Some(enricher) = &self.enricher {
            extra_widgets(&enricher()?, &mut widgets)?;
        }

        Ok(Message {
            text,
            title: format!("{}: {}", record.level_name, record.message),
            subtitle: config.application_name.clone().unwrap_or_default(),
            widgets,
            uncollapsible: UNCOLLAPSIBLE_WIDGETS,
        })
    }
}

impl fmt::Debug for MessageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuilder")
            .field("config", &self.config)
            .field("enricher", &self.enricher.is_some())
            .finish()
    }
}

fn severity_label(record: &LogRecord) -> String {
    format!("<font color='{}'>{}</font>", color_for(record.level), record.level_name)
}

fn environment_badge(name: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("NA");
    format!("{} [Env]", capitalize_words(name))
}

fn extra_widgets(extra: &ExtraFields, widgets: &mut Vec<Widget>) -> Result<(), NotifyError> {
    for (key, value) in extra.iter() {
        let value = match value {
            ExtraValue::Text(text) => text.clone(),
            ExtraValue::Json(serde_json::Value::Null) => String::new(),
            ExtraValue::Json(json) => serde_json::to_string(json).map_err(|source| {
                NotifyError::Serialization { field: key.to_string(), source }
            })?,
        };

        let widget = if is_numeric(key) {
            Widget::new(Icon::Description, value)
        } else {
            let label = title_case(key);
            Widget::new(Icon::ConfirmationNumberIcon, format!("<b>{label}:</b> {value}"))
        };
        widgets.push(widget);
    }
    Ok(())
}

/// Positional keys look like numbers (`"0"`, `"12"`, `"1.5"`).
fn is_numeric(key: &str) -> bool {
    let key = key.trim();
    key.chars().any(|c| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && key.parse::<f64>().is_ok()
}

/// `retry_count` -> `Retry Count`.
fn title_case(key: &str) -> String {
    capitalize_words(&key.replace('_', " "))
}

/// Uppercase the first letter of every space-separated word, leaving the
/// rest untouched.
fn capitalize_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}

/// Cut `s` to at most `max` characters, keeping the head.
pub fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::RenderedPayload;
    use crate::config::CardSchema;
    use chrono::{TimeZone, Utc};
    use serde::{Serialize, Serializer};

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    fn record(level: Severity, formatted: &str) -> LogRecord {
        LogRecord::new(level, "boom")
            .with_formatted(formatted)
            .with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
    }

    fn builder(config: NotificationConfig) -> MessageBuilder {
        MessageBuilder::new(Arc::new(config))
    }

    #[test]
    fn named_severities_have_fixed_colors() {
        assert_eq!(color_for(Severity::Warning), "#ffc400");
        assert_eq!(color_for(Severity::Notice), "#00aeff");
        assert_eq!(color_for(Severity::Info), "#48d62f");
        assert_eq!(color_for(Severity::Debug), "#000000");
    }

    #[test]
    fn severe_and_unknown_levels_are_red() {
        for level in [Severity::Emergency, Severity::Alert, Severity::Critical, Severity::Error] {
            assert_eq!(color_for(level), COLOR_RED);
        }
        for code in [0, 1, 99, 101, 401, 650, u16::MAX] {
            assert_eq!(color_for_code(code), COLOR_RED);
        }
        assert_eq!(color_for_code(300), COLOR_AMBER);
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("héllo".to_string(), 2), "hé");
        assert_eq!(truncate_chars("short".to_string(), 10), "short");
    }

    #[test]
    fn body_is_capped_and_keeps_mention_prefix() {
        let config = NotificationConfig::default().with_default_mentions("all,42");
        let long = "x".repeat(MAX_TEXT_CHARS * 2);
        let payload = builder(config).build(&record(Severity::Error, &long)).unwrap();

        let text = payload.text();
        assert_eq!(text.chars().count(), MAX_TEXT_CHARS);
        assert!(text.starts_with("<users/all> <users/42> xxx"));
    }

    #[test]
    fn short_body_is_untouched() {
        let payload = builder(NotificationConfig::default())
            .build(&record(Severity::Info, "all good"))
            .unwrap();
        assert_eq!(payload.text(), "all good");
    }

    #[test]
    fn fixed_widgets_come_first_in_order() {
        let config = NotificationConfig::default()
            .with_environment("production eu")
            .with_application("billing", Some("https://billing.example".to_string()));
        let payload = builder(config).build(&record(Severity::Warning, "slow")).unwrap();

        assert_eq!(
            payload.widget_texts(),
            vec![
                "Production Eu [Env]",
                "<font color='#ffc400'>WARNING</font>",
                "2024-05-01T12:30:00.000000+00:00",
                "https://billing.example",
            ]
        );
    }

    #[test]
    fn missing_environment_and_url_degrade_gracefully() {
        let payload = builder(NotificationConfig::default())
            .build(&record(Severity::Debug, "x"))
            .unwrap();
        let texts = payload.widget_texts();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[0], "NA [Env]");
    }

    #[test]
    fn header_uses_level_name_and_application() {
        let config = NotificationConfig::default().with_application("billing", None);
        let payload = builder(config).build(&record(Severity::Error, "x")).unwrap();
        match payload {
            RenderedPayload::CardsV2(p) => {
                let card = &p.cards_v2[0].card;
                assert_eq!(card.header.title, "ERROR: boom");
                assert_eq!(card.header.subtitle, "billing");
                assert_eq!(card.sections.uncollapsible_widgets_count, 3);
            }
            other => panic!("expected cardsV2 payload, got {other:?}"),
        }
    }

    #[test]
    fn extra_fields_are_labelled_and_serialized() {
        let mut extra = ExtraFields::new();
        extra
            .insert("retry_count", serde_json::json!(3))
            .insert("user", "alice")
            .insert("payload", serde_json::json!({"id": 7}))
            .insert("missing", serde_json::Value::Null);
        extra.push("positional note");

        let rec = record(Severity::Error, "x").with_extra(extra);
        let payload = builder(NotificationConfig::default()).build(&rec).unwrap();
        let texts = payload.widget_texts();

        assert_eq!(
            &texts[3..],
            &[
                "<b>Retry Count:</b> 3",
                "<b>User:</b> alice",
                "<b>Payload:</b> {\"id\":7}",
                "<b>Missing:</b> ",
                "positional note",
            ]
        );
    }

    #[test]
    fn enricher_fields_follow_record_extra() {
        let rec = record(Severity::Error, "x")
            .with_extra(ExtraFields::from_iter([("request_id", "abc")]));
        let builder = builder(NotificationConfig::default()).with_enricher(|| {
            let mut fields = ExtraFields::new();
            fields.insert("host_name", "web-1");
            Ok(fields)
        });

        let message = builder.message(&rec).unwrap();
        let extra: Vec<(Icon, &str)> =
            message.widgets[3..].iter().map(|w| (w.icon, w.text.as_str())).collect();
        assert_eq!(
            extra,
            vec![
                (Icon::ConfirmationNumberIcon, "<b>Request Id:</b> abc"),
                (Icon::ConfirmationNumberIcon, "<b>Host Name:</b> web-1"),
            ]
        );
    }

    #[test]
    fn unserializable_enricher_value_fails_the_build() {
        let builder = builder(NotificationConfig::default()).with_enricher(|| {
            let mut fields = ExtraFields::new();
            fields.insert("host_name", "web-1");
            fields.insert_serialize("bad_field", &Unserializable)?;
            Ok(fields)
        });

        match builder.build(&record(Severity::Error, "x")) {
            Err(NotifyError::Serialization { field, .. }) => assert_eq!(field, "bad_field"),
            other => panic!("expected serialization error, got {other:?}"),
        }
    }

    #[test]
    fn enricher_error_is_returned_unchanged() {
        let builder = builder(NotificationConfig::default())
            .with_enricher(|| Err(NotifyError::Configuration("no host".to_string())));

        let err = builder.message(&record(Severity::Info, "x")).unwrap_err();
        assert!(matches!(err, NotifyError::Configuration(msg) if msg == "no host"));
    }

    #[test]
    fn legacy_schema_renders_same_content() {
        let config = NotificationConfig::default().with_schema(CardSchema::Legacy);
        let payload = builder(config).build(&record(Severity::Notice, "fyi")).unwrap();
        assert!(matches!(payload, RenderedPayload::Legacy(_)));
        assert_eq!(payload.widget_texts()[1], "<font color='#00aeff'>NOTICE</font>");
    }

    #[test]
    fn retry_count_example_end_to_end() {
        let config = NotificationConfig::default()
            .with_level_mentions(Severity::Error, "42")
            .with_default_mentions("all");
        let mut extra = ExtraFields::new();
        extra.insert("retry_count", serde_json::json!(3));
        let rec = LogRecord::new(Severity::Error, "boom")
            .with_formatted("boom occurred")
            .with_extra(extra);

        let payload = builder(config).build(&rec).unwrap();
        assert!(payload.text().starts_with("<users/all> <users/42> boom occurred"));
        assert!(payload.widget_texts().contains(&"<b>Retry Count:</b> 3"));
    }
}
