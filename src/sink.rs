//! Destinations for rendered log lines.

use std::io::Write;

/// The process output stream a line belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Receives fully rendered lines, newline included.
///
/// Implementations must not fail: a line that cannot be written is dropped.
pub trait LogSink: Send + Sync {
    fn write(&self, stream: Stream, line: &str);
}

/// Writes lines to the process's standard output and error streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, stream: Stream, line: &str) {
        // Each line is written under the stream lock so concurrent callers never interleave.
        let _ = match stream {
            Stream::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(line.as_bytes()).and_then(|_| out.flush())
            }
            Stream::Stderr => {
                let mut err = std::io::stderr().lock();
                err.write_all(line.as_bytes()).and_then(|_| err.flush())
            }
        };
    }
}
