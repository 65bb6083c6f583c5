use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use todonote_core::NoteId;
use todonote_server::{create_router, AppState, ServerConfig};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    dir: TempDir,
}

fn app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let public_dir = dir.path().join("public");
    std::fs::create_dir_all(&public_dir).unwrap();
    std::fs::write(public_dir.join("index.htm"), "<html>todonote</html>").unwrap();

    let config = ServerConfig {
        data_file: dir.path().join("data.json"),
        public_dir,
        log_dir: dir.path().join("logs"),
        ..ServerConfig::default()
    };
    TestApp {
        router: create_router(Arc::new(AppState::new(config))),
        dir,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

async fn create(app: &TestApp, title: &str) -> String {
    let (status, note) = send(app, "POST", "/api/notes", Some(json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    note["id"].as_str().unwrap().to_string()
}

fn titles(notes: &Value) -> Vec<&str> {
    notes
        .as_array()
        .unwrap()
        .iter()
        .map(|note| note["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ping"], "pong");
}

#[tokio::test]
async fn test_create_returns_201_and_persists() {
    let app = app();
    let (status, note) = send(
        &app,
        "POST",
        "/api/notes",
        Some(json!({ "title": "  Buy milk ", "body": "2 litres" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["title"], "Buy milk");
    assert_eq!(note["body"], "2 litres");
    assert_eq!(note["completed"], false);
    assert_eq!(note["deleted"], false);
    assert_eq!(note["history"], json!([]));
    assert_eq!(note["createdAt"], note["updatedAt"]);

    let stored = std::fs::read_to_string(app.dir.path().join("data.json")).unwrap();
    let stored: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["notes"][0]["id"], note["id"]);
}

#[tokio::test]
async fn test_create_without_title_is_400() {
    let app = app();
    for body in [json!({}), json!({ "title": "   " })] {
        let (status, error) = send(&app, "POST", "/api/notes", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error, json!({ "error": "title required" }));
    }
}

#[tokio::test]
async fn test_malformed_json_is_400_with_error_body() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/notes")
        .header("content-type", "application/json")
        .body(Body::from("{ title"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_ids_are_404() {
    let app = app();
    let missing = NoteId::generate();
    for uri in [
        format!("/api/notes/{missing}"),
        "/api/notes/not-a-uuid".to_string(),
        "/api/notes/%20".to_string(),
    ] {
        let (status, error) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error, json!({ "error": "Not found" }));
    }

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/notes/{missing}"),
        Some(json!({ "title": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_filters_by_status_and_deleted_flag() {
    let app = app();
    let _open = create(&app, "open").await;
    let done = create(&app, "done").await;
    let gone = create(&app, "gone").await;

    send(
        &app,
        "POST",
        &format!("/api/notes/{done}/complete"),
        Some(json!({ "completed": true })),
    )
    .await;
    let (status, ack) = send(&app, "DELETE", &format!("/api/notes/{gone}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "ok": true }));

    let (_, all) = send(&app, "GET", "/api/notes", None).await;
    assert_eq!(titles(&all), vec!["gone", "done", "open"]);

    let (_, active) = send(&app, "GET", "/api/notes?status=active", None).await;
    assert_eq!(titles(&active), vec!["open"]);

    let (_, completed) = send(&app, "GET", "/api/notes?status=completed", None).await;
    assert_eq!(titles(&completed), vec!["done"]);

    let (_, deleted) = send(&app, "GET", "/api/notes?deleted=true", None).await;
    assert_eq!(titles(&deleted), vec!["gone"]);

    let (_, live) = send(&app, "GET", "/api/notes?deleted=false", None).await;
    assert_eq!(titles(&live), vec!["done", "open"]);

    let (status, error) = send(&app, "GET", "/api/notes?status=archived", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().unwrap().contains("archived"));
}

#[tokio::test]
async fn test_update_records_history_only_on_change() {
    let app = app();
    let id = create(&app, "Draft").await;
    let uri = format!("/api/notes/{id}");

    let (status, same) = send(&app, "PUT", &uri, Some(json!({ "title": "Draft" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same["history"], json!([]));

    let (_, edited) = send(&app, "PUT", &uri, Some(json!({ "body": "details" }))).await;
    assert_eq!(edited["title"], "Draft");
    assert_eq!(edited["body"], "details");
    let history = edited["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["action"], "Edited");
    assert_eq!(history[0]["from"], json!({ "title": "Draft", "body": "" }));
    assert_eq!(history[0]["to"], json!({ "title": "Draft", "body": "details" }));

    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "title": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_soft_delete_restore_and_purge() {
    let app = app();
    let id = create(&app, "chores").await;

    send(
        &app,
        "POST",
        &format!("/api/notes/{id}/complete"),
        Some(json!({ "completed": true })),
    )
    .await;
    send(&app, "DELETE", &format!("/api/notes/{id}"), None).await;

    let (_, deleted) = send(&app, "GET", &format!("/api/notes/{id}"), None).await;
    assert_eq!(deleted["deleted"], true);
    assert!(deleted["deletedAt"].is_string());

    let (status, restored) = send(&app, "POST", &format!("/api/notes/{id}/restore"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["deleted"], false);
    assert_eq!(restored["completed"], true);
    assert!(restored.get("deletedAt").is_none());

    // Purging requires the note to be in the deleted view first.
    let (status, _) = send(&app, "DELETE", &format!("/api/notes/{id}/permanent"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(&app, "DELETE", &format!("/api/notes/{id}"), None).await;
    let (status, ack) = send(&app, "DELETE", &format!("/api/notes/{id}/permanent"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({ "ok": true }));

    let (status, _) = send(&app, "GET", &format!("/api/notes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_toggle_appends_history() {
    let app = app();
    let id = create(&app, "task").await;
    let uri = format!("/api/notes/{id}/complete");

    let (_, done) = send(&app, "POST", &uri, Some(json!({ "completed": true }))).await;
    assert_eq!(done["completed"], true);
    let (_, reopened) = send(&app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(reopened["completed"], false);

    let actions: Vec<_> = reopened["history"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, vec!["Completed", "MarkedActive"]);
}

#[tokio::test]
async fn test_complete_without_body_marks_active() {
    let app = app();
    let id = create(&app, "task").await;
    let uri = format!("/api/notes/{id}/complete");
    send(&app, "POST", &uri, Some(json!({ "completed": true }))).await;

    let (status, note) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["completed"], false);

    let request = Request::builder()
        .method("POST")
        .uri(&uri)
        .header("content-type", "application/json")
        .body(Body::from("{ completed"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_serves_stores_with_short_random_ids() {
    let app = app();
    std::fs::write(
        app.dir.path().join("data.json"),
        r#"{"notes":[{"id":"V1StGXR8_Z5jdHi6B-myT","title":"Water plants","body":"","createdAt":"2025-03-01T09:00:00.000Z","updatedAt":"2025-03-01T09:00:00.000Z","completed":false,"deleted":false,"history":[]}]}"#,
    )
    .unwrap();

    let (status, all) = send(&app, "GET", "/api/notes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&all), vec!["Water plants"]);

    let (status, note) = send(
        &app,
        "POST",
        "/api/notes/V1StGXR8_Z5jdHi6B-myT/complete",
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["id"], "V1StGXR8_Z5jdHi6B-myT");
    assert_eq!(note["completed"], true);
}

#[tokio::test]
async fn test_unknown_paths_fall_back_to_index_page() {
    let app = app();
    let (status, body) = send(&app, "GET", "/deleted", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("<html>todonote</html>".to_string()));
}
