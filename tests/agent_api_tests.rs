mod common;

use common::snapshot;
use serde_json::json;
use std::time::Duration;
use voicechat_client::{AgentApi, AgentApiError, HttpAgentApi};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> HttpAgentApi {
    HttpAgentApi::new(&server.uri(), "2024-12-01", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_start_posts_to_proxy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/proxyAIGCFetch"))
        .and(query_param("Action", "StartVoiceChat"))
        .and(query_param("Version", "2024-12-01"))
        .and(body_partial_json(json!({
            "AppId": "app",
            "RoomId": "Room123",
            "TaskId": "User123",
            "AgentConfig": { "UserId": "RobotMan_", "TargetUserId": ["User123"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ResponseMetadata": {},
            "Result": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    api(&server)
        .start(&snapshot().start_request())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_stop_posts_to_proxy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/proxyAIGCFetch"))
        .and(query_param("Action", "StopVoiceChat"))
        .and(body_partial_json(json!({ "RoomId": "Room123", "TaskId": "User123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ResponseMetadata": {} })))
        .expect(1)
        .mount(&server)
        .await;

    api(&server).stop(&snapshot().stop_request()).await.unwrap();
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = api(&server)
        .start(&snapshot().start_request())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentApiError::Status(500)));
}

#[tokio::test]
async fn test_error_in_response_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ResponseMetadata": {
                "Error": { "Code": "InvalidParameter", "Message": "RoomId is required" }
            }
        })))
        .mount(&server)
        .await;

    let err = api(&server)
        .stop(&snapshot().stop_request())
        .await
        .unwrap_err();

    match err {
        AgentApiError::Remote { code, message } => {
            assert_eq!(code, "InvalidParameter");
            assert_eq!(message, "RoomId is required");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
