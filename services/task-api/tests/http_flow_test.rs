//! HTTP 端到端流程（内存存储）

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use task_api::api::http::{AppState, router};
use task_api::application::{AccountService, TaskService};
use tasker_adapter_memory::{InMemoryAccountRepository, InMemoryTaskRepository};
use tasker_auth_core::{CredentialHasher, HashingCost, TokenService};
use tasker_common::{CancellationToken, TimeoutPolicy};
use tower::ServiceExt;

const SECRET: &[u8] = b"http-flow-test-secret-0123456789abcdef";

fn app(unify_login_errors: bool) -> Router {
    let tokens = Arc::new(TokenService::new(SECRET, chrono::Duration::hours(24)));
    let hasher = CredentialHasher::new(HashingCost {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let timeouts = TimeoutPolicy::new(Duration::from_secs(5));

    let state = AppState {
        accounts: AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            hasher,
            tokens.clone(),
            timeouts,
        ),
        tasks: TaskService::new(Arc::new(InMemoryTaskRepository::new()), timeouts),
        tokens,
        metrics: None,
        unify_login_errors,
    };

    router(state, CancellationToken::new())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, username: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

fn task_body(title: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": "details",
        "due_date": "2026-12-01T09:30:00Z",
        "status": status,
    })
}

#[tokio::test]
async fn test_registration_and_login() {
    let app = app(true);

    let root = register(&app, "root", "root-pass").await;
    assert_eq!(root["role"], "ADMINISTRATOR");
    assert!(root.get("password").is_none());
    assert!(root.get("password_hash").is_none());

    // 请求体中的 role 被忽略
    let (status, alice) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({"username": "alice", "password": "pw", "role": "ADMINISTRATOR"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(alice["role"], "MEMBER");

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({"username": "alice", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "username already exists");

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"username": "alice", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["id"], alice["id"]);
}

#[tokio::test]
async fn test_register_validation() {
    let app = app(true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "password is required");

    let (status, _) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!("not an object")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_unified() {
    let app = app(true);
    register(&app, "alice", "pw").await;

    for (username, password) in [("alice", "wrong"), ("nobody", "pw")] {
        let (status, body) = send(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({"username": username, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid credentials");
    }
}

#[tokio::test]
async fn test_login_failures_distinct() {
    let app = app(false);
    register(&app, "alice", "pw").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"username": "nobody", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user not found");

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"username": "alice", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "wrong password");
}

#[tokio::test]
async fn test_task_lifecycle() {
    let app = app(true);
    register(&app, "root", "pw").await;
    register(&app, "alice", "pw").await;
    let admin = login(&app, "root", "pw").await;
    let member = login(&app, "alice", "pw").await;

    let (status, body) = send(&app, Method::GET, "/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authorization header is required");

    let (status, body) = send(
        &app,
        Method::POST,
        "/admin/tasks",
        Some(&member),
        Some(task_body("write report", "open")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");

    let (status, created) = send(
        &app,
        Method::POST,
        "/admin/tasks",
        Some(&admin),
        Some(task_body("write report", "open")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "write report");
    assert_eq!(created["due_date"], "2026-12-01T09:30:00Z");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, "/tasks", Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, &format!("/tasks/{id}"), Some(&member), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/admin/tasks/{id}"),
        Some(&admin),
        Some(task_body("write report", "done")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["status"], "done");

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/admin/tasks/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "deleted successfully");

    let (status, body) = send(&app, Method::GET, &format!("/tasks/{id}"), Some(&member), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "task not found");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/admin/tasks/{id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_input_validation() {
    let app = app(true);
    register(&app, "root", "pw").await;
    let admin = login(&app, "root", "pw").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/admin/tasks",
        Some(&admin),
        Some(json!({"title": "t", "description": "d", "status": "open"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "due_date is required");

    let (status, body) = send(&app, Method::GET, "/tasks/not-a-uuid", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid task id");
}

#[tokio::test]
async fn test_promote_member() {
    let app = app(true);
    register(&app, "root", "pw").await;
    let alice = register(&app, "alice", "pw").await;
    let admin = login(&app, "root", "pw").await;
    let member = login(&app, "alice", "pw").await;

    let uri = format!("/admin/promote/{}", alice["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::PUT, &uri, Some(&member), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::PUT, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "promoted to admin");

    // 旧令牌里的角色不变，重新登录后生效
    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/tasks",
        Some(&member),
        Some(task_body("t", "open")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let promoted = login(&app, "alice", "pw").await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/admin/tasks",
        Some(&promoted),
        Some(task_body("t", "open")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/admin/promote/00000000-0000-0000-0000-000000000000",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "account not found");
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = app(true);

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, _) = send(&app, Method::GET, "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
