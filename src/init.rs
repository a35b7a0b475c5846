use crate::layer::GoogleChatLayer;
use crate::sink::LogSink;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the Google Chat logging layer.
///
/// **Fields**
/// - `channel_buffer`: maximum number of [`LogRecord`](crate::record::LogRecord)s
///   waiting for delivery before new ones are dropped.
/// - `min_level`: least severe `tracing` level forwarded to the sink.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top so events are also printed to the console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub channel_buffer: usize,
    pub min_level: Level,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            min_level: Level::ERROR,
            enable_stdout: true,
        }
    }
}

/// Initialize global `tracing` subscriber using the provided sink and
/// [`LayerConfig`].
///
/// **Parameters**
/// - `sink`: implementation of [`LogSink`] that will receive
///   [`LogRecord`](crate::record::LogRecord)s, usually a
///   [`GoogleChatSink`](crate::google_chat::GoogleChatSink).
/// - `config`: [`LayerConfig`] controlling buffering and filtering.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
///
/// Must be called from within a Tokio runtime.
pub fn init_tracing_with_config(
    sink: Arc<dyn LogSink>,
    config: LayerConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let (layer, _handle) = GoogleChatLayer::new(sink, config.channel_buffer, config.min_level);

    // The two branches build different subscriber types.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Initialize tracing with sensible defaults.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`LayerConfig::default`]: `ERROR` events go to the sink and everything
/// is mirrored to stdout.
pub fn init_tracing(sink: Arc<dyn LogSink>) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    init_tracing_with_config(sink, LayerConfig::default())
}
