//! Gemini client tests against a mocked HTTP backend

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadflow::models::{ChatMessage, MessageRole};
use leadflow::services::GeminiClient;
use leadflow::utils::errors::AiError;

fn client(base_url: String) -> GeminiClient {
    GeminiClient::new("test-key".to_string(), "gemini-2.0-flash".to_string(), 5)
        .unwrap()
        .with_base_url(base_url)
}

fn history_turn(id: i64, role: MessageRole, content: &str) -> ChatMessage {
    ChatMessage {
        id,
        user_id: 1,
        role,
        content: content.to_string(),
        created_at: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn successful_completion_returns_candidate_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Бот-магазин стоит от 1500 сомони."}]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(server.uri())
        .generate(&[], "сколько стоит бот?")
        .await
        .unwrap();

    assert_eq!(reply, "Бот-магазин стоит от 1500 сомони.");
}

#[tokio::test]
async fn history_is_sent_in_order_before_the_new_turn() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "привет"}]},
                {"role": "model", "parts": [{"text": "Здравствуйте!"}]},
                {"role": "user", "parts": [{"text": "а цены?"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Зависит от задачи."}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let history = vec![
        history_turn(1, MessageRole::User, "привет"),
        history_turn(2, MessageRole::Model, "Здравствуйте!"),
    ];

    let reply = client(server.uri()).generate(&history, "а цены?").await.unwrap();
    assert_eq!(reply, "Зависит от задачи.");
}

#[tokio::test]
async fn http_error_maps_to_request_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(server.uri()).generate(&[], "привет").await.unwrap_err();
    assert!(matches!(err, AiError::RequestFailed(_)));
}

#[tokio::test]
async fn empty_candidate_list_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = client(server.uri()).generate(&[], "привет").await.unwrap_err();
    assert!(matches!(err, AiError::InvalidResponse(_)));
}
