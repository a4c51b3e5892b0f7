use notilog::cli::Cli;
use notilog::config::{Config, NotificationConfig, NotificationType};
use notilog::{ConfigError, Logger, Severity};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn load_toml(toml_content: &str) -> Result<Config, ConfigError> {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", toml_content).unwrap();

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    Config::load(&cli)
}

#[test]
#[serial]
fn test_load_full_valid_config() {
    let config = load_toml(
        r#"
        app_name = "billing"
        log_level = "debug"
        context = "Invoices"
        [notification]
        level = "error"
        type = "discord"
        webhook_url = "https://discord.com/api/webhooks/1/abc"
    "#,
    )
    .unwrap();

    assert_eq!(config.app_name, "billing");
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.context.as_deref(), Some("Invoices"));
    assert_eq!(
        config.notification,
        Some(NotificationConfig {
            level: Some("error".to_string()),
            kind: NotificationType::Discord,
            webhook_url: Some("https://discord.com/api/webhooks/1/abc".to_string()),
        })
    );

    let logger = Logger::from_config(&config).unwrap();
    assert_eq!(logger.notification().level, Severity::Error);
    assert_eq!(
        logger.notification().notifier.as_ref().map(|n| n.name()),
        Some("discord")
    );
    assert_eq!(logger.context(), Some("Invoices"));
}

#[test]
#[serial]
fn test_load_default_values() {
    let config = load_toml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn test_invalid_notification_level_fails_before_logging() {
    let config = load_toml(
        r#"
        [notification]
        level = "noisy"
        type = "slack"
        webhook_url = "https://hooks.slack.com/services/T/B/X"
    "#,
    )
    .unwrap();

    let err = Logger::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidLevel(ref level) if level == "noisy"));
    assert_eq!(err.to_string(), "Invalid log level: noisy");
}

#[test]
#[serial]
fn test_explicit_backend_without_url_is_rejected() {
    let config = load_toml(
        r#"
        [notification]
        type = "slack"
    "#,
    )
    .unwrap();

    let err = Logger::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::MissingWebhookUrl(NotificationType::Slack)));
}

#[test]
#[serial]
fn test_unknown_type_means_no_backend() {
    let config = load_toml(
        r#"
        [notification]
        type = "pager"
        webhook_url = "https://example.com/hook"
    "#,
    )
    .unwrap();

    let logger = Logger::from_config(&config).unwrap();
    assert!(logger.notification().notifier.is_none());
}

#[test]
#[serial]
fn test_invalid_value_type() {
    let result = load_toml(
        r#"
        [notification]
        level = 3
    "#,
    );
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
#[serial]
fn test_auto_selection_reads_environment() {
    std::env::set_var("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X");
    std::env::set_var("DISCORD_WEBHOOK_URL", "https://discord.com/api/webhooks/1/abc");

    let config = load_toml(
        r#"
        [notification]
        type = "auto"
    "#,
    )
    .unwrap();
    let slack = Logger::from_config(&config).unwrap();

    std::env::remove_var("SLACK_WEBHOOK_URL");
    let discord = Logger::from_config(&config).unwrap();

    std::env::remove_var("DISCORD_WEBHOOK_URL");
    let none = Logger::from_config(&config).unwrap();

    assert_eq!(slack.notification().notifier.as_ref().map(|n| n.name()), Some("slack"));
    assert_eq!(discord.notification().notifier.as_ref().map(|n| n.name()), Some("discord"));
    assert!(none.notification().notifier.is_none());
    assert_eq!(none.notification().level, Severity::Warn);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    std::env::set_var("NOTILOG_LOG_LEVEL", "warn");
    std::env::set_var("NOTILOG_NOTIFICATION__LEVEL", "fatal");

    let result = load_toml(
        r#"
        log_level = "debug"
        [notification]
        level = "error"
        type = "slack"
        webhook_url = "https://hooks.slack.com/services/T/B/X"
    "#,
    );

    std::env::remove_var("NOTILOG_LOG_LEVEL");
    std::env::remove_var("NOTILOG_NOTIFICATION__LEVEL");

    let config = result.unwrap();
    assert_eq!(config.log_level, "warn");
    assert_eq!(
        config.notification.and_then(|n| n.level),
        Some("fatal".to_string())
    );
}

#[test]
#[serial]
fn test_cli_overrides_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        context = "FromFile"
        [notification]
        type = "slack"
        webhook_url = "https://hooks.slack.com/services/T/B/X"
    "#
    )
    .unwrap();

    let cli = Cli {
        config: Some(file.path().to_path_buf()),
        context: Some("FromCli".to_string()),
        discord_webhook: Some("https://discord.com/api/webhooks/1/abc".to_string()),
        notify_level: Some("debug".to_string()),
        ..Default::default()
    };

    let config = Config::load(&cli).unwrap();
    assert_eq!(config.context.as_deref(), Some("FromCli"));
    let notification = config.notification.unwrap();
    assert_eq!(notification.kind, NotificationType::Discord);
    assert_eq!(
        notification.webhook_url.as_deref(),
        Some("https://discord.com/api/webhooks/1/abc")
    );
    assert_eq!(notification.level.as_deref(), Some("debug"));
}
