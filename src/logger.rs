//! The console logger with optional chat notifications.
//!
//! Every logging call renders one line, writes it synchronously to stdout or
//! stderr and, when a backend is configured and the severity clears the
//! notification threshold, hands the color-stripped line to the backend on a
//! detached task. Delivery failures become an extra error line; they never
//! reach the caller.

use chrono::Local;
use futures::future::join_all;
use serde_json::Value;
use std::backtrace::BacktraceStatus;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, DeliveryError};
use crate::formatting::{strip_color, Color, TextFormatter};
use crate::level::Severity;
use crate::notification::{NotificationSettings, Notifier};
use crate::sink::{ConsoleSink, LogSink, Stream};

/// Context label of the lines reporting failed deliveries.
const FAILURE_CONTEXT: &str = "Logger";

/// `log` targets of the HTTP stack. Their records are written but never
/// forwarded, so a delivery can't trigger another delivery.
const TRANSPORT_TARGETS: [&str; 6] = ["reqwest", "hyper", "hyper_util", "h2", "rustls", "want"];

struct Shared {
    app_name: String,
    log_level: Severity,
    notification: NotificationSettings,
    sink: Arc<dyn LogSink>,
    formatter: TextFormatter,
    last_record: Mutex<Option<Instant>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

/// A leveled console logger that can forward lines to a chat webhook.
///
/// Cloning is cheap. Clones share the output sink, the backend, the pending
/// deliveries and the elapsed-time counter.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    context: Option<String>,
}

macro_rules! level_methods {
    ($($severity:ident => $plain:ident, $annotated:ident;)*) => {
        $(
            #[doc = concat!("Logs `message` at `", stringify!($plain), "` severity.")]
            pub fn $plain(&self, message: impl fmt::Display) {
                self.emit(Severity::$severity, message, None);
            }

            #[doc = concat!("Logs `message` with key/value annotations at `", stringify!($plain), "` severity.")]
            pub fn $annotated(&self, message: impl fmt::Display, annotations: &Value) {
                self.emit(Severity::$severity, message, Some(annotations));
            }
        )*
    };
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Builds a logger writing to the console. Fails on an invalid level or
    /// an explicit backend without a webhook URL.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let log_level = config.log_level.parse::<Severity>()?;
        let notification = NotificationSettings::from_config(config.notification.as_ref())?;

        let mut builder = Logger::builder()
            .app_name(config.app_name.clone())
            .log_level(log_level)
            .notification(notification);
        if let Some(context) = &config.context {
            builder = builder.context(context.clone());
        }
        Ok(builder.build())
    }

    /// Returns a logger that labels its lines with `context`.
    pub fn with_context(&self, context: impl Into<String>) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            context: Some(context.into()),
        }
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn notification(&self) -> &NotificationSettings {
        &self.shared.notification
    }

    level_methods! {
        Fatal => fatal, fatal_with;
        Error => error, error_with;
        Warn => warn, warn_with;
        Log => log, log_with;
        Debug => debug, debug_with;
        Verbose => verbose, verbose_with;
    }

    /// Logs `message` at `severity`.
    pub fn emit(&self, severity: Severity, message: impl fmt::Display, annotations: Option<&Value>) {
        if !severity.is_enabled(self.shared.log_level) {
            return;
        }
        let rendered = self
            .shared
            .formatter
            .format_message(&message.to_string(), annotations);
        self.print(severity, self.context.as_deref(), &rendered, true);
    }

    /// Logs an error line followed by `stack`.
    ///
    /// The stack trace goes to every configured backend regardless of the
    /// notification threshold.
    pub fn error_with_stack(&self, message: impl fmt::Display, annotations: Option<&Value>, stack: &str) {
        if !Severity::Error.is_enabled(self.shared.log_level) {
            return;
        }
        self.emit(Severity::Error, message, annotations);
        self.print_stack(stack);
    }

    /// Logs `err` with its full cause chain, and its backtrace when one was
    /// captured.
    pub fn report(&self, err: &anyhow::Error) {
        let message = format!("{:#}", err);
        let backtrace = err.backtrace();
        if backtrace.status() == BacktraceStatus::Captured {
            self.error_with_stack(message, None, &backtrace.to_string());
        } else {
            self.error(message);
        }
    }

    /// Waits until every notification dispatched so far has completed.
    pub async fn flush(&self) {
        loop {
            let handles: Vec<_> = lock(&self.shared.pending).drain(..).collect();
            if handles.is_empty() {
                break;
            }
            debug!(count = handles.len(), "Waiting for pending notifications.");
            for result in join_all(handles).await {
                if let Err(e) = result {
                    warn!(error = %e, "Notification task did not complete");
                }
            }
        }
    }

    /// Registers a clone of this logger as the global `log` logger.
    pub fn install(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.shared.log_level.level_filter());
        Ok(())
    }

    fn print(&self, severity: Severity, context: Option<&str>, message: &str, notify: bool) {
        let line = self.render_line(severity, context, message);
        self.shared.sink.write(severity.stream(), &line);

        if notify && self.shared.notification.should_notify(severity) {
            self.dispatch(strip_color(&line));
        }
    }

    fn print_stack(&self, stack: &str) {
        if stack.is_empty() {
            return;
        }
        self.shared.sink.write(Stream::Stderr, &format!("{}\n", stack));

        if self.shared.notification.notifier.is_some() {
            self.dispatch(stack.to_string());
        }
    }

    fn render_line(&self, severity: Severity, context: Option<&str>, message: &str) -> String {
        let f = &self.shared.formatter;
        let color = severity.color();

        let pid = f.colorize(
            color,
            &format!("[{}] {}  - ", self.shared.app_name, std::process::id()),
        );
        let timestamp = Local::now().format("%m/%d/%Y, %-I:%M:%S %p");
        let level = f.colorize(color, &format!("{:>7}", severity.label().to_uppercase()));
        let context = context
            .map(|c| f.colorize(Color::Yellow, &format!("[{}] ", c)))
            .unwrap_or_default();
        let elapsed = self
            .elapsed_ms()
            .map(|ms| format!(" {}", f.colorize(Color::Yellow, &format!("+{}ms", ms))))
            .unwrap_or_default();

        format!("{}{} {} {}{}{}\n", pid, timestamp, level, context, message, elapsed)
    }

    /// Milliseconds since the previous line, `None` for the very first one.
    fn elapsed_ms(&self) -> Option<u128> {
        let now = Instant::now();
        let previous = lock(&self.shared.last_record).replace(now);
        previous.map(|p| now.duration_since(p).as_millis())
    }

    fn dispatch(&self, text: String) {
        let Some(notifier) = self.shared.notification.notifier.clone() else {
            return;
        };

        let Ok(handle) = Handle::try_current() else {
            self.report_delivery_failure(&DeliveryError::Other(
                "no Tokio runtime is available to deliver the notification".to_string(),
            ));
            return;
        };

        let logger = self.clone();
        let task = handle.spawn(deliver(notifier, text, logger));

        let mut pending = lock(&self.shared.pending);
        pending.retain(|h| !h.is_finished());
        pending.push(task);
    }

    fn report_delivery_failure(&self, err: &DeliveryError) {
        let message = self
            .shared
            .formatter
            .colorize(Severity::Error.color(), &format!("Failed to send notification: {}", err));
        self.print(Severity::Error, Some(FAILURE_CONTEXT), &message, false);
    }
}

async fn deliver(notifier: Arc<dyn Notifier>, text: String, logger: Logger) {
    if let Err(err) = notifier.notify(&text).await {
        logger.report_delivery_failure(&err);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("app_name", &self.shared.app_name)
            .field("context", &self.context)
            .field("log_level", &self.shared.log_level)
            .field("notification", &self.shared.notification)
            .finish()
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        Severity::from(metadata.level()).is_enabled(self.shared.log_level)
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let severity = Severity::from(record.level());
        let target = record.target();
        let context = self.context.as_deref().unwrap_or(target);
        let message = self.shared.formatter.format_message(&record.args().to_string(), None);
        let notify = !TRANSPORT_TARGETS
            .iter()
            .any(|t| target == *t || target.starts_with(&format!("{}::", t)));

        self.print(severity, Some(context), &message, notify);
    }

    fn flush(&self) {}
}

/// Builder for [`Logger`].
pub struct LoggerBuilder {
    app_name: String,
    context: Option<String>,
    log_level: Severity,
    notification: NotificationSettings,
    sink: Arc<dyn LogSink>,
    colors: Option<bool>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            app_name: "notilog".to_string(),
            context: None,
            log_level: Severity::Verbose,
            notification: NotificationSettings::disabled(),
            sink: Arc::new(ConsoleSink),
            colors: None,
        }
    }
}

impl LoggerBuilder {
    /// Name shown in the bracketed prefix of every line.
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Minimum severity written at all.
    pub fn log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    /// Minimum severity forwarded to the backend.
    pub fn notification_level(mut self, level: Severity) -> Self {
        self.notification.level = level;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notification.notifier = Some(notifier);
        self
    }

    pub fn notification(mut self, settings: NotificationSettings) -> Self {
        self.notification = settings;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Forces colors on or off. By default `NO_COLOR` decides.
    pub fn colors(mut self, enabled: bool) -> Self {
        self.colors = Some(enabled);
        self
    }

    pub fn build(self) -> Logger {
        let formatter = self
            .colors
            .map(TextFormatter::new)
            .unwrap_or_else(TextFormatter::from_env);

        Logger {
            shared: Arc::new(Shared {
                app_name: self.app_name,
                log_level: self.log_level,
                notification: self.notification,
                sink: self.sink,
                formatter,
                last_record: Mutex::new(None),
                pending: Mutex::new(Vec::new()),
            }),
            context: self.context,
        }
    }
}
