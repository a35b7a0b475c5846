use crate::error::NotifyError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log severity, ordered from most to least severe.
///
/// The numeric codes follow the syslog-style scale used by most PHP and
/// Java logging stacks (Emergency = 600 down to Debug = 100), which lets
/// records coming from other pipelines be mapped with [`Severity::from_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    pub fn code(self) -> u16 {
        match self {
            Severity::Emergency => 600,
            Severity::Alert => 550,
            Severity::Critical => 500,
            Severity::Error => 400,
            Severity::Warning => 300,
            Severity::Notice => 250,
            Severity::Info => 200,
            Severity::Debug => 100,
        }
    }

    /// Returns `None` for codes outside the known scale.
    pub fn from_code(code: u16) -> Option<Self> {
        Severity::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Lowercase name, as used in configuration keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Emergency => "emergency",
            Severity::Alert => "alert",
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Notice => "notice",
            Severity::Info => "info",
            Severity::Debug => "debug",
        }
    }

    /// Uppercase display label (`"ERROR"`).
    pub fn label(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown severity `{0}`")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let severity = match lower.as_str() {
            "emergency" | "emerg" => Severity::Emergency,
            "alert" => Severity::Alert,
            "critical" | "crit" => Severity::Critical,
            "error" | "err" => Severity::Error,
            "warning" | "warn" => Severity::Warning,
            "notice" => Severity::Notice,
            "info" => Severity::Info,
            "debug" | "trace" => Severity::Debug,
            _ => return Err(ParseSeverityError(s.to_string())),
        };
        Ok(severity)
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::DEBUG | tracing::Level::TRACE => Severity::Debug,
        }
    }
}

/// Value of a caller-supplied extra field.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraValue {
    Text(String),
    Json(serde_json::Value),
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Text(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::Text(value)
    }
}

impl From<serde_json::Value> for ExtraValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => ExtraValue::Text(s),
            other => ExtraValue::Json(other),
        }
    }
}

/// Ordered key/value fields shown as extra widgets on the card.
///
/// Keys are kept in insertion order and are not deduplicated. Numeric keys
/// (`"0"`, `"1"`) are treated as positional entries and rendered without a
/// label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraFields {
    entries: Vec<(String, ExtraValue)>,
}

impl ExtraFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> &mut Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Append a positional entry keyed by its index.
    pub fn push(&mut self, value: impl Into<ExtraValue>) -> &mut Self {
        let key = self.entries.len().to_string();
        self.insert(key, value)
    }

    /// Serialize `value` with `serde_json` and append it.
    ///
    /// **Returns**
    /// - `Err(NotifyError::Serialization)` naming `key` if `value` cannot be
    ///   represented as JSON. Nothing is inserted in that case.
    pub fn insert_serialize<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, NotifyError> {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(json) => Ok(self.insert(key, json)),
            Err(source) => Err(NotifyError::Serialization { field: key, source }),
        }
    }

    pub fn extend(&mut self, other: ExtraFields) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtraValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ExtraValue>> FromIterator<(K, V)> for ExtraFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = ExtraFields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// A single log event, as seen by the message builder.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub level_name: String,
    pub message: String,
    /// Full rendered line, including any context dump. Unbounded.
    pub formatted: String,
    /// Structured fields captured from the logging framework.
    pub context: Vec<(String, serde_json::Value)>,
    pub extra: ExtraFields,
}

impl LogRecord {
    /// Record stamped with the current time, `level_name` derived from
    /// `level` and `formatted` equal to `message`.
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        let message = message.into();
        LogRecord {
            timestamp: Utc::now(),
            level,
            level_name: level.label(),
            formatted: message.clone(),
            message,
            context: Vec::new(),
            extra: ExtraFields::new(),
        }
    }

    pub fn with_formatted(mut self, formatted: impl Into<String>) -> Self {
        self.formatted = formatted.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_extra(mut self, extra: ExtraFields) -> Self {
        self.extra = extra;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serializer;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn severity_codes_round_trip() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from_code(severity.code()), Some(severity));
        }
        assert_eq!(Severity::from_code(0), None);
        assert_eq!(Severity::from_code(401), None);
    }

    #[test]
    fn severity_is_ordered_most_severe_first() {
        assert!(Severity::Emergency < Severity::Error);
        assert!(Severity::Warning < Severity::Debug);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!(" warn ".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn tracing_levels_map_onto_severity() {
        assert_eq!(Severity::from(tracing::Level::ERROR), Severity::Error);
        assert_eq!(Severity::from(tracing::Level::WARN), Severity::Warning);
        assert_eq!(Severity::from(tracing::Level::TRACE), Severity::Debug);
    }

    #[test]
    fn extra_fields_keep_insertion_order() {
        let mut extra = ExtraFields::new();
        extra.insert("zeta", "1").insert("alpha", "2");
        extra.push("positional");
        let keys: Vec<&str> = extra.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "2"]);
    }

    #[test]
    fn json_strings_become_text() {
        let value = ExtraValue::from(serde_json::json!("plain"));
        assert_eq!(value, ExtraValue::Text("plain".to_string()));
    }

    #[test]
    fn insert_serialize_reports_failing_field() {
        let mut extra = ExtraFields::new();
        let err = extra.insert_serialize("payload", &Unserializable).unwrap_err();
        match err {
            NotifyError::Serialization { field, .. } => assert_eq!(field, "payload"),
            other => panic!("expected serialization error, got {other:?}"),
        }
        assert!(extra.is_empty());
    }
}
