//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments of the `notilog` binary
//! using the `clap` crate. Flags that mirror configuration keys are merged on
//! top of the TOML file and environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Write a log line to the console and forward it to a chat webhook.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Severity of the record to write.
    #[arg(short, long, value_name = "LEVEL", default_value = "log")]
    pub level: String,

    /// Context label shown in brackets before the message.
    #[arg(long, value_name = "LABEL")]
    pub context: Option<String>,

    /// Minimum severity forwarded to the notification backend.
    #[arg(long, value_name = "LEVEL")]
    pub notify_level: Option<String>,

    /// Send notifications to this Slack incoming webhook.
    #[arg(long, value_name = "URL", conflicts_with_all = ["discord_webhook", "auto_notify"])]
    pub slack_webhook: Option<String>,

    /// Send notifications to this Discord webhook.
    #[arg(long, value_name = "URL", conflicts_with = "auto_notify")]
    pub discord_webhook: Option<String>,

    /// Pick the backend from SLACK_WEBHOOK_URL or DISCORD_WEBHOOK_URL.
    #[arg(long)]
    pub auto_notify: bool,

    /// Annotation in `key=value` form. Values are parsed as JSON when possible.
    #[arg(short, long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// The message to log.
    #[arg(value_name = "MESSAGE", default_value = "")]
    pub message: String,
}

impl Cli {
    /// Builds the annotation object from the `--field` arguments.
    ///
    /// Returns `None` when no field was given. Arguments without `=` become
    /// keys with a `true` value.
    pub fn annotations(&self) -> Option<serde_json::Value> {
        if self.fields.is_empty() {
            return None;
        }

        let mut map = serde_json::Map::new();
        for field in &self.fields {
            let (key, value) = match field.split_once('=') {
                Some((key, raw)) => (
                    key,
                    serde_json::from_str(raw)
                        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string())),
                ),
                None => (field.as_str(), serde_json::Value::Bool(true)),
            };
            map.insert(key.to_string(), value);
        }
        Some(serde_json::Value::Object(map))
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(context) = &self.context {
            dict.insert("context".into(), Value::from(context.clone()));
        }

        let backend = if let Some(url) = &self.slack_webhook {
            Some(("slack", Some(url)))
        } else if let Some(url) = &self.discord_webhook {
            Some(("discord", Some(url)))
        } else if self.auto_notify {
            Some(("auto", None))
        } else {
            None
        };

        if backend.is_some() || self.notify_level.is_some() {
            let mut notification = Dict::new();
            if let Some((kind, url)) = backend {
                notification.insert("type".into(), Value::from(kind));
                if let Some(url) = url {
                    notification.insert("webhook_url".into(), Value::from(url.clone()));
                }
            }
            if let Some(level) = &self.notify_level {
                notification.insert("level".into(), Value::from(level.clone()));
            }
            dict.insert("notification".into(), Value::Dict(Tag::Default, notification));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
