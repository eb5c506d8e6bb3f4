use super::*;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> CompletionClient {
    let config = OpenAiConfig {
        api_base: format!("{}/v1", server.uri()),
        chat_model: "gpt-4o-mini".to_string(),
        ..Default::default()
    };
    CompletionClient::new(&config, "test-key".to_string()).expect("client should build")
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_sends_both_roles_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "Kontext" },
                { "role": "user", "content": "Wo bekomme ich Essen?" },
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Bei der Tafel." } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let answer =
        tokio::task::spawn_blocking(move || client.complete("Kontext", "Wo bekomme ich Essen?"))
            .await
            .expect("task should not panic")
            .expect("completion should succeed");

    assert_eq!(answer, "Bei der Tafel.");
}

#[tokio::test(flavor = "multi_thread")]
async fn upstream_error_surfaces_as_completion_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = tokio::task::spawn_blocking(move || client.complete("s", "u"))
        .await
        .expect("task should not panic");

    assert!(matches!(result, Err(crate::ChatError::Completion(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = tokio::task::spawn_blocking(move || client.complete("s", "u"))
        .await
        .expect("task should not panic");

    assert!(matches!(result, Err(crate::ChatError::Completion(_))));
}
