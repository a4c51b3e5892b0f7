//! Delivery guarantees of the two webhook backends.

use notilog::notification::discord::{chunk_message, DISCORD_MESSAGE_LIMIT};
use notilog::{DiscordNotifier, Notifier, SlackNotifier};
use serde_json::Value;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn accepting_server(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_empty_message_issues_no_calls() {
    let server = accepting_server(200).await;

    let backends: Vec<Box<dyn Notifier>> = vec![
        Box::new(SlackNotifier::new(server.uri())),
        Box::new(DiscordNotifier::new(server.uri())),
    ];
    for backend in &backends {
        assert!(backend.notify("").await.is_ok(), "{} failed", backend.name());
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_discord_call_count_matches_message_length() {
    for len in [1usize, 1999, 2000, 2001, 5999, 6000, 10_001] {
        let server = accepting_server(204).await;
        let message: String = (0..len).map(|i| if i % 7 == 0 { 'ß' } else { 'q' }).collect();

        DiscordNotifier::new(server.uri()).notify(&message).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), len.div_ceil(DISCORD_MESSAGE_LIMIT), "length {}", len);

        let rebuilt: String = requests
            .iter()
            .map(|r| {
                let body: Value = serde_json::from_slice(&r.body).unwrap();
                body["content"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(rebuilt, message);
        assert_eq!(chunk_message(&message, DISCORD_MESSAGE_LIMIT).concat(), message);
    }
}

#[tokio::test]
async fn test_slack_sends_single_call_with_text_payload() {
    let server = accepting_server(200).await;
    let message = "line one\nline two";

    SlackNotifier::new(server.uri()).notify(message).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, serde_json::json!({ "text": message }));
}
