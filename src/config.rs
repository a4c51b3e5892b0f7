//! Configuration management for notilog
//!
//! This module defines the `Config` struct and its sub-structs. It uses the
//! `figment` crate to layer defaults, an optional TOML file, environment
//! variables and command-line arguments.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cli::Cli;
use crate::error::ConfigError;

/// Prefix of the environment variables that override configuration values,
/// e.g. `NOTILOG_LOG_LEVEL=debug` or `NOTILOG_NOTIFICATION__TYPE=slack`.
pub const ENV_PREFIX: &str = "NOTILOG_";

/// The main configuration struct.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Name shown in the bracketed prefix of every console line.
    pub app_name: String,
    /// Minimum severity written to the console.
    pub log_level: String,
    /// Context label attached to every line, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Outbound notification settings. Absent means no backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationConfig>,
}

/// Configuration for chat-webhook notifications.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NotificationConfig {
    /// Minimum severity forwarded to the backend. Defaults to `warn`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// How the backend is chosen. Defaults to `auto`.
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    /// The webhook URL; required for `slack` and `discord`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Backend selection.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// Probe `SLACK_WEBHOOK_URL`, then `DISCORD_WEBHOOK_URL`.
    #[default]
    Auto,
    Slack,
    Discord,
    /// Any unrecognized value. Resolves to no backend.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationType::Auto => "auto",
            NotificationType::Slack => "slack",
            NotificationType::Discord => "discord",
            NotificationType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl Config {
    /// Loads the configuration, layering defaults, the file named by
    /// `--config` (if any), `NOTILOG_*` environment variables and the
    /// command-line arguments, in increasing priority.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "notilog".to_string(),
            log_level: "verbose".to_string(),
            context: None,
            notification: None,
        }
    }
}
