//! Error types shared across the crate.
//!
//! Configuration problems are raised once, at setup time. Delivery problems
//! never reach the caller of a logging operation; the logger turns them into
//! a secondary log line.

use thiserror::Error;

use crate::config::NotificationType;

/// Raised while turning configuration into a working logger.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("A webhook URL is required for the {0} notification backend")]
    MissingWebhookUrl(NotificationType),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

/// Raised by a notification backend when a message could not be delivered.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook responded with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{0}")]
    Other(String),
}
