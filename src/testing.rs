//! In-memory sinks and fake notifiers for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::DeliveryError;
use crate::notification::Notifier;
use crate::sink::{LogSink, Stream};

/// Records every written line together with its stream.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(Stream, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Stream, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn stdout(&self) -> Vec<String> {
        self.on(Stream::Stdout)
    }

    pub fn stderr(&self) -> Vec<String> {
        self.on(Stream::Stderr)
    }

    fn on(&self, stream: Stream) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, stream: Stream, line: &str) {
        self.lines.lock().unwrap().push((stream, line.to_string()));
    }
}

/// A notifier that records messages instead of sending them.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
        if !message.is_empty() {
            self.messages.lock().unwrap().push(message.to_string());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A notifier whose every delivery fails with the given reason.
#[derive(Debug)]
pub struct FailingNotifier {
    reason: String,
    attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _message: &str) -> Result<(), DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DeliveryError::Other(self.reason.clone()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
