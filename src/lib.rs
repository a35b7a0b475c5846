pub mod error;
pub mod record;
pub mod config;
pub mod env;
pub mod mention;
pub mod card;
pub mod message;
pub mod transport;
pub mod dispatch;
pub mod sink;
pub mod google_chat;
pub mod layer;
pub mod init;

pub use config::{CardSchema, NotificationConfig};
pub use error::{NotifyError, TransportError};
pub use google_chat::GoogleChatSink;
pub use message::MessageBuilder;
pub use record::{ExtraFields, LogRecord, Severity};
