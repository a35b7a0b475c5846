use crate::error::NotifyError;
use crate::record::LogRecord;
use async_trait::async_trait;

/// Asynchronous destination for [`LogRecord`]s produced by the logging layer.
///
/// Implementations deliver a record to a concrete backend (Google Chat,
/// stdout, a test recorder, ...). The layer calls `send` from a background
/// task and never awaits it on the application thread.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Deliver a single log record.
    ///
    /// **Parameters**
    /// - `record`: fully-populated [`LogRecord`] produced by the layer.
    ///
    /// **Returns**
    /// - `Ok(())` if every destination accepted the record.
    /// - `Err(..)` if building or delivering failed. The layer reports the
    ///   error and drops the record; it is not retried.
    async fn send(&self, record: &LogRecord) -> Result<(), NotifyError>;
}
