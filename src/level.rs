//! Severity levels and their fixed total order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::formatting::Color;
use crate::sink::Stream;

/// The importance of a log record, from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Verbose,
    Debug,
    Log,
    Warn,
    Error,
    Fatal,
}

impl Severity {
    /// Every level, lowest first.
    pub const ALL: [Severity; 6] = [
        Severity::Verbose,
        Severity::Debug,
        Severity::Log,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Debug => "debug",
            Severity::Log => "log",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }

    /// Returns `true` if a record of this severity passes `threshold`.
    pub fn is_enabled(self, threshold: Severity) -> bool {
        self >= threshold
    }

    /// The output stream records of this severity are written to.
    pub fn stream(self) -> Stream {
        match self {
            Severity::Error | Severity::Fatal => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }

    pub(crate) fn color(self) -> Color {
        match self {
            Severity::Verbose => Color::BrightCyan,
            Severity::Debug => Color::BrightMagenta,
            Severity::Log => Color::Green,
            Severity::Warn => Color::Yellow,
            Severity::Error => Color::Red,
            Severity::Fatal => Color::Bold,
        }
    }

    /// The most verbose `log` filter that still lets records at or above
    /// this severity through.
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            Severity::Verbose => log::LevelFilter::Trace,
            Severity::Debug => log::LevelFilter::Debug,
            Severity::Log => log::LevelFilter::Info,
            Severity::Warn => log::LevelFilter::Warn,
            Severity::Error | Severity::Fatal => log::LevelFilter::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" => Ok(Severity::Verbose),
            "debug" => Ok(Severity::Debug),
            "log" | "info" => Ok(Severity::Log),
            "warn" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            _ => Err(ConfigError::InvalidLevel(s.to_string())),
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warn,
            log::Level::Info => Severity::Log,
            log::Level::Debug => Severity::Debug,
            log::Level::Trace => Severity::Verbose,
        }
    }
}
