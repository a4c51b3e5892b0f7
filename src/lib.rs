/// notilog - A console logger that forwards important lines to chat webhooks
///
/// This library renders colorized, annotated log lines and, above a
/// configurable severity, delivers them to a Slack or Discord webhook without
/// blocking the caller.
pub mod notification;

pub mod cli;
pub mod config;
pub mod error;
pub mod formatting;
pub mod level;
pub mod logger;
pub mod sink;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export core types for convenience
pub use error::{ConfigError, DeliveryError};
pub use formatting::{colorize, format_message, strip_color, Color, TextFormatter};
pub use level::Severity;
pub use logger::{Logger, LoggerBuilder};
pub use notification::{DiscordNotifier, NotificationSettings, Notifier, SlackNotifier};
pub use sink::{ConsoleSink, LogSink, Stream};
