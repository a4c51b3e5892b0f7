//! Tests of the `notilog` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notilog() -> Command {
    let mut cmd = Command::cargo_bin("notilog").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("SLACK_WEBHOOK_URL")
        .env_remove("DISCORD_WEBHOOK_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_writes_annotated_line_to_stdout() {
    notilog()
        .args(["--level", "warn", "--context", "Deploy"])
        .args(["-f", "version=1.2", "-f", "env=prod"])
        .arg("release started")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "    WARN [Deploy] release started version=1.2 env=prod\n",
        ))
        .stdout(predicate::str::contains("[notilog] "))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_error_level_goes_to_stderr() {
    notilog()
        .args(["--level", "error", "migration failed"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("   ERROR migration failed"));
}

#[test]
fn test_invalid_level_exits_with_error() {
    notilog()
        .args(["--level", "loud", "hello"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid log level: loud"));
}

#[test]
fn test_invalid_notify_level_fails_before_logging() {
    notilog()
        .args(["--notify-level", "noisy", "--slack-webhook", "https://hooks.slack.com/x"])
        .arg("hello")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid log level: noisy"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delivers_to_slack_before_exit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/hook", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        notilog()
            .args(["--level", "fatal", "--slack-webhook", url.as_str(), "out of memory"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    assert!(output.status.success());

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("   FATAL out of memory"));
    assert_eq!(text, String::from_utf8_lossy(&output.stderr));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_below_notify_level_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let url = server.uri();
    let status = tokio::task::spawn_blocking(move || {
        notilog()
            .args(["--level", "log", "--notify-level", "warn", "--discord-webhook", url.as_str()])
            .arg("routine message")
            .output()
            .unwrap()
            .status
    })
    .await
    .unwrap();
    assert!(status.success());
}
