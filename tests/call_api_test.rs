//! Call API Integration Tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use confab::application::CallService;
use confab::config::ProviderConfig;
use confab::domain::room::{Room, StandardCallTypeClassifier};
use confab::domain::user::User;
use confab::infrastructure::persistence::{
    InMemoryCallRepository, InMemoryMessageRepository, InMemoryRoomRepository,
    InMemoryUserRepository,
};
use confab::infrastructure::provider::StaticProviderRegistry;
use confab::interface::api::{build_router, init_metrics, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot`
use uuid::Uuid;

struct TestServer {
    app: Router,
    alice: String,
    bob: String,
    direct_room: String,
    channel: String,
    livechat_room: String,
}

fn setup_call_api_test() -> TestServer {
    let calls = Arc::new(InMemoryCallRepository::new());
    let rooms = Arc::new(InMemoryRoomRepository::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());

    let alice = User::new("alice".to_string(), Some("Alice".to_string()));
    let bob = User::new("bob".to_string(), None);
    let direct_room = Room::direct(vec![alice.id, bob.id]);
    let channel = Room::channel("general".to_string());
    let livechat_room = Room::livechat();

    let alice_id = alice.id.to_string();
    let bob_id = bob.id.to_string();
    let direct_room_id = direct_room.id.to_string();
    let channel_id = channel.id.to_string();
    let livechat_room_id = livechat_room.id.to_string();

    users.insert(alice);
    users.insert(bob);
    rooms.insert(direct_room);
    rooms.insert(channel);
    rooms.insert(livechat_room);

    let registry = Arc::new(StaticProviderRegistry::from_config(&ProviderConfig::default()));

    let call_service = Arc::new(CallService::new(
        calls,
        rooms,
        users,
        messages,
        registry,
        Arc::new(StandardCallTypeClassifier),
        "https://chat.test",
    ));

    let prometheus_handle = init_metrics();
    let app = build_router(AppState { call_service }, prometheus_handle);

    TestServer {
        app,
        alice: alice_id,
        bob: bob_id,
        direct_room: direct_room_id,
        channel: channel_id,
        livechat_room: livechat_room_id,
    }
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}

async fn post_empty(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}

async fn start_call(srv: &TestServer, room_id: &str, user_id: &str) -> String {
    let (status, body) = send_json(
        &srv.app,
        "POST",
        "/calls/start",
        json!({ "room_id": room_id, "user_id": user_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    body["data"]["call_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_api_start_group_call_and_get() {
    let srv = setup_call_api_test();

    let (status, body) = send_json(
        &srv.app,
        "POST",
        "/calls/start",
        json!({ "room_id": srv.channel, "user_id": srv.alice, "title": "Standup" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["type"], "videoconference");
    let call_id = body["data"]["call_id"].as_str().unwrap();

    let (status, body) = get_json(&srv.app, &format!("/calls/{}", call_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "started");
    assert_eq!(body["data"]["title"], "Standup");
    assert_eq!(body["data"]["type"], "videoconference");
    assert!(body["data"]["url"].is_string());
    assert_eq!(body["data"]["created_by"]["username"], "alice");
    // Provider state never leaves the server
    assert!(body["data"].get("provider_data").is_none());
}

#[tokio::test]
async fn test_api_direct_call_flow() {
    let srv = setup_call_api_test();

    let (status, body) = send_json(
        &srv.app,
        "POST",
        "/calls/start",
        json!({ "room_id": srv.direct_room, "user_id": srv.alice }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["type"], "direct");
    assert_eq!(body["data"]["callee"], srv.bob);
    let call_id = body["data"]["call_id"].as_str().unwrap().to_string();

    let (_, body) = get_json(&srv.app, &format!("/calls/{}", call_id)).await;
    assert_eq!(body["data"]["status"], "calling");
    assert!(body["data"]["url"].is_string());

    // Joins customize the URL stored at creation
    let (status, body) = send_json(
        &srv.app,
        "POST",
        &format!("/calls/{}/join", call_id),
        json!({ "user_id": srv.bob }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.contains("username=bob"));

    let (status, body) = send_json(
        &srv.app,
        "POST",
        &format!("/calls/{}/cancel", call_id),
        json!({ "user_id": srv.alice }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = get_json(&srv.app, &format!("/calls/{}", call_id)).await;
    assert_eq!(body["data"]["status"], "ended");
    assert_eq!(body["data"]["ended_by"]["username"], "alice");
}

#[tokio::test]
async fn test_api_join_passes_options() {
    let srv = setup_call_api_test();
    let call_id = start_call(&srv, &srv.channel, &srv.alice).await;

    let (status, body) = send_json(
        &srv.app,
        "POST",
        &format!("/calls/{}/join", call_id),
        json!({ "user_id": srv.bob, "mic": false }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.contains("username=bob"));
    assert!(url.contains("mic=false"));
}

#[tokio::test]
async fn test_api_cancel_rejects_group_calls() {
    let srv = setup_call_api_test();
    let call_id = start_call(&srv, &srv.channel, &srv.alice).await;

    let (status, body) = send_json(
        &srv.app,
        "POST",
        &format!("/calls/{}/cancel", call_id),
        json!({ "user_id": srv.alice }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_api_end_livechat_call() {
    let srv = setup_call_api_test();
    let livechat_id = start_call(&srv, &srv.livechat_room, &srv.alice).await;
    let group_id = start_call(&srv, &srv.channel, &srv.alice).await;

    let (status, body) =
        post_empty(&srv.app, &format!("/calls/{}/end-livechat", livechat_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ended"], true);

    let (_, body) = get_json(&srv.app, &format!("/calls/{}", livechat_id)).await;
    assert_eq!(body["data"]["status"], "ended");
    assert!(body["data"]["ended_by"].is_null());

    // Only livechat calls can be ended this way
    let (status, body) = post_empty(&srv.app, &format!("/calls/{}/end-livechat", group_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ended"], false);

    let (_, body) = get_json(&srv.app, &format!("/calls/{}", group_id)).await;
    assert_eq!(body["data"]["status"], "started");
}

#[tokio::test]
async fn test_api_error_statuses() {
    let srv = setup_call_api_test();

    let (status, body) = get_json(&srv.app, &format!("/calls/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = send_json(
        &srv.app,
        "POST",
        "/calls/start",
        json!({ "room_id": Uuid::new_v4().to_string(), "user_id": srv.alice }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid room");

    // Direct calls cannot target a channel
    let (status, _) = send_json(
        &srv.app,
        "POST",
        "/calls",
        json!({
            "type": "direct",
            "room_id": srv.channel,
            "created_by": srv.alice,
            "provider_name": "jitsi"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // A started group call cannot go back to calling
    let call_id = start_call(&srv, &srv.channel, &srv.alice).await;
    let (status, _) = send_json(
        &srv.app,
        "PUT",
        &format!("/calls/{}/status", call_id),
        json!({ "status": "calling" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_json(
        &srv.app,
        "POST",
        &format!("/calls/{}/join", call_id),
        json!({ "user_id": Uuid::new_v4().to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_api_set_ended_markers() {
    let srv = setup_call_api_test();
    let call_id = start_call(&srv, &srv.channel, &srv.alice).await;

    let (status, _) = send_json(
        &srv.app,
        "PUT",
        &format!("/calls/{}/ended-by/{}", call_id, srv.alice),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &srv.app,
        "PUT",
        &format!("/calls/{}/ended-at", call_id),
        json!({ "ended_at": "2026-08-23T10:00:00Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&srv.app, &format!("/calls/{}", call_id)).await;
    assert_eq!(body["data"]["ended_by"]["username"], "alice");
    let ended_at = body["data"]["ended_at"].as_str().unwrap();
    assert!(ended_at.starts_with("2026-08-23T10:00:00"));
}

#[tokio::test]
async fn test_api_add_user() {
    let srv = setup_call_api_test();
    let call_id = start_call(&srv, &srv.channel, &srv.alice).await;

    let (status, body) = send_json(
        &srv.app,
        "POST",
        &format!("/calls/{}/users", call_id),
        json!({ "user_id": srv.bob }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = get_json(&srv.app, &format!("/calls/{}", call_id)).await;
    let participants = body["data"]["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["user"]["username"], "bob");
}

#[tokio::test]
async fn test_api_list_room_calls() {
    let srv = setup_call_api_test();

    for _ in 0..3 {
        start_call(&srv, &srv.channel, &srv.alice).await;
    }

    let (status, body) = get_json(
        &srv.app,
        &format!("/rooms/{}/calls?offset=0&count=2", srv.channel),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["calls"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["count"], 2);

    let (_, body) = get_json(
        &srv.app,
        &format!("/rooms/{}/calls?offset=2&count=2", srv.channel),
    )
    .await;
    assert_eq!(body["data"]["calls"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_api_list_providers() {
    let srv = setup_call_api_test();

    let (status, body) = get_json(&srv.app, "/providers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["key"], "jitsi");
    assert_eq!(body["data"][0]["label"], "Jitsi");
}

#[tokio::test]
async fn test_api_health_check() {
    let srv = setup_call_api_test();

    let (status, body) = get_json(&srv.app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "OK");
}

#[tokio::test]
async fn test_api_get_metrics() {
    let srv = setup_call_api_test();

    // Record at least one counter before scraping
    start_call(&srv, &srv.channel, &srv.alice).await;

    let response = srv
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("calls_created_total"));
}
