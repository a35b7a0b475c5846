use crate::record::{ExtraFields, LogRecord, Severity};
use crate::sink::LogSink;
use chrono::{SecondsFormat, Utc};
use std::sync::{atomic::{AtomicU64, Ordering}, Arc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Targets never forwarded to the sink: this crate and the HTTP stack it
/// posts through. Events from them are emitted while delivering a record.
const IGNORED_TARGETS: [&str; 5] = [OWN_TARGET, "reqwest", "hyper", "hyper_util", "h2"];

/// `true` when `target` is one of [`IGNORED_TARGETS`] or a module below it.
fn is_ignored_target(target: &str) -> bool {
    IGNORED_TARGETS.iter().any(|name| {
        target
            .strip_prefix(name)
            .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// hands them to a [`LogSink`] via a bounded channel and background task.
///
/// By default only `ERROR` events are captured. Each record is sent
/// exactly once: failures are reported on stderr and counted, never
/// retried.
pub struct GoogleChatLayer {
    sender: mpsc::Sender<LogRecord>,
    min_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full.
    pub dropped_events: Arc<AtomicU64>,
    /// Rejected by the sink.
    pub failed_events: Arc<AtomicU64>,
}

impl GoogleChatLayer {
    /// Create a new layer and spawn a background task that pulls
    /// [`LogRecord`]s from a bounded channel and sends them to `sink`.
    ///
    /// Must be called from within a Tokio runtime. A minimal buffer of 16
    /// is enforced.
    pub fn new(sink: Arc<dyn LogSink>, buffer: usize, min_level: Level) -> (Self, JoinHandle<()>) {
        let buffer = buffer.max(16);
        let (tx, mut rx) = mpsc::channel::<LogRecord>(buffer);

        let total_events = Arc::new(AtomicU64::new(0));
        let enqueued_events = Arc::new(AtomicU64::new(0));
        let dropped_events = Arc::new(AtomicU64::new(0));
        let failed_events = Arc::new(AtomicU64::new(0));

        let failed_events_bg = Arc::clone(&failed_events);

        let handle = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if let Err(e) = sink.send(&record).await {
                    failed_events_bg.fetch_add(1, Ordering::Relaxed);
                    eprintln!("error sending log record to google chat: {}", e);
                }
            }
        });

        (Self {
            sender: tx,
            min_level,
            total_events,
            enqueued_events,
            dropped_events,
            failed_events,
        }, handle)
    }
}

impl<S> Layer<S> for GoogleChatLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.min_level || is_ignored_target(meta.target()) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let level = visitor.severity.unwrap_or_else(|| Severity::from(*meta.level()));
        let message = visitor.message.unwrap_or_default();
        let timestamp = Utc::now();
        let formatted = format_line(
            &timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            meta.target(),
            level,
            &message,
            &visitor.fields,
        );

        let record = LogRecord {
            timestamp,
            level,
            level_name: level.label(),
            message,
            formatted,
            context: visitor.fields,
            extra: ExtraFields::new(),
        };

        match self.sender.try_send(record) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(_e) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("google chat log channel full, dropping log record");
            }
        }
    }
}

/// `[2024-05-01T12:30:00.000Z] app::billing.ERROR: charge failed {"order_id":7}`
fn format_line(
    timestamp: &str,
    target: &str,
    level: Severity,
    message: &str,
    fields: &[(String, serde_json::Value)],
) -> String {
    let mut line = format!("[{}] {}.{}: {}", timestamp, target, level.label(), message);
    if !fields.is_empty() {
        let context: serde_json::Map<String, serde_json::Value> = fields.iter().cloned().collect();
        line.push(' ');
        line.push_str(&serde_json::Value::Object(context).to_string());
    }
    line
}

use tracing::field::{Field, Visit};

/// Collects event fields in recording order.
///
/// `message` becomes the record message; a parseable `severity` field
/// overrides the level derived from the `tracing` level.
#[derive(Default)]
pub struct FieldVisitor {
    pub fields: Vec<(String, serde_json::Value)>,
    pub message: Option<String>,
    pub severity: Option<Severity>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.push((field.name().to_string(), value));
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            "severity" => match value.parse() {
                Ok(severity) => self.severity = Some(severity),
                Err(_) => self.insert(field, serde_json::Value::String(value.to_string())),
            },
            _ => self.insert(field, serde_json::Value::String(value.to_string())),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, serde_json::Value::String(format!("{:?}", value)));
        }
    }
}
