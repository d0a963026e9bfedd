mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{harness, snapshot, subtitle_frame, Harness, USER};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tower::ServiceExt;
use voicechat_client::protocol::tlv;
use voicechat_client::{create_router, AppState};

fn app(h: &Harness) -> Router {
    create_router(AppState::new(h.client.clone(), snapshot(), h.sink.clone()))
}

async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let response = app(&h)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_start_and_stop_session() {
    let h = harness();

    let (status, body) = call(app(&h), "POST", "/session/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert_eq!(body["session"]["enabled"], true);
    assert_eq!(body["session"]["phase"], "active");

    let (status, body) = call(app(&h), "GET", "/session/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], USER);

    let (status, body) = call(app(&h), "POST", "/session/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["enabled"], false);
    assert_eq!(h.api.stops(), 1);
}

#[tokio::test]
async fn test_update_restarts_agent() {
    let h = harness();
    call(app(&h), "POST", "/session/start", None).await;

    let (status, _) = call(app(&h), "POST", "/session/update", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.api.starts(), 2);
    assert_eq!(h.api.stops(), 1);
}

#[tokio::test]
async fn test_update_applies_new_settings() {
    let h = harness();
    let app = app(&h);
    call(app.clone(), "POST", "/session/start", None).await;

    let changes = json!({
        "welcome_message": "Welcome back",
        "config": { "LLMConfig": { "Mode": "ArkV3", "ModelName": "doubao" } }
    });
    let (status, _) = call(app.clone(), "POST", "/session/update", Some(changes)).await;
    assert_eq!(status, StatusCode::OK);

    let request = h.api.last_start.lock().unwrap().clone().unwrap();
    assert_eq!(request.agent_config.welcome_message, "Welcome back");
    assert_eq!(request.config["LLMConfig"]["Mode"], "ArkV3");
    assert_eq!(request.room_id, common::ROOM);

    // Later starts keep the updated settings
    call(app, "POST", "/session/start", None).await;
    let request = h.api.last_start.lock().unwrap().clone().unwrap();
    assert_eq!(request.agent_config.welcome_message, "Welcome back");
    assert_eq!(h.api.starts(), 3);
}

#[tokio::test]
async fn test_update_rejects_malformed_body() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/session/update")
        .header("content-type", "application/json")
        .body(Body::from("{\"welcome_message\": 7"))
        .unwrap();

    let response = app(&h).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.api.starts(), 0);
}

#[tokio::test]
async fn test_failed_start_is_bad_gateway() {
    let h = harness();
    h.api.fail_start.store(true, Ordering::SeqCst);

    let (status, body) = call(app(&h), "POST", "/session/start", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("start"));
}

#[tokio::test]
async fn test_command_requires_active_agent() {
    let h = harness();
    let command = json!({ "command": "interrupt", "interrupt_priority": 1 });

    let (status, _) = call(app(&h), "POST", "/session/command", Some(command.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(h.transport.sent().is_empty());

    call(app(&h), "POST", "/session/start", None).await;

    let (status, body) = call(app(&h), "POST", "/session/command", Some(command)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "sent");
    assert_eq!(body["interrupting"], true);
    assert_eq!(h.transport.sent().len(), 1);
}

#[tokio::test]
async fn test_text_command_defaults_priority() {
    let h = harness();
    call(app(&h), "POST", "/session/start", None).await;

    let command = json!({ "command": "ExternalTextToSpeech", "message": "Hello there" });
    let (status, body) = call(app(&h), "POST", "/session/command", Some(command)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["interrupting"], false);
}

#[tokio::test]
async fn test_transcript_endpoint() {
    let h = harness();
    h.client
        .on_inbound_bytes(&subtitle_frame(USER, "Hello", true, true))
        .await;

    let (status, body) = call(app(&h), "GET", "/session/transcript", None).await;

    assert_eq!(status, StatusCode::OK);
    let utterances = body.as_array().unwrap();
    assert_eq!(utterances.len(), 1);
    assert_eq!(utterances[0]["text"], "Hello");
    assert_eq!(utterances[0]["role"], "user");
}

#[tokio::test]
async fn test_events_stream_over_websocket() {
    let h = harness();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app(&h);
    tokio::spawn(async move { axum::serve(listener, router).await });

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/session/events", addr))
        .await
        .unwrap();

    let brief = tlv::encode(tlv::TAG_BRIEF, r#"{"Stage":{"Code":1,"Description":"listening"}}"#)
        .unwrap();
    h.client.on_inbound_bytes(&brief).await;
    h.client
        .on_inbound_bytes(&subtitle_frame(USER, "Hello", true, true))
        .await;

    let mut received = Vec::new();
    while received.len() < 2 {
        let message = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if message.is_text() {
            let event: Value = serde_json::from_str(message.to_text().unwrap()).unwrap();
            if event["type"] != "speaking_update" {
                received.push(event);
            }
        }
    }

    assert_eq!(received[0]["type"], "status_update");
    assert_eq!(received[0]["status"], "listening");
    assert_eq!(received[1]["type"], "user_message");
    assert_eq!(received[1]["text"], "Hello");
    assert_eq!(received[1]["user"], USER);
}
