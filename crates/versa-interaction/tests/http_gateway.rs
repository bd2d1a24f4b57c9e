//! HttpApiGateway against a loopback axum server.

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use versa_core::api::ApiGateway;
use versa_core::assistant::NewAssistant;
use versa_core::auth::{AuthHeaders, LoginRequest};
use versa_core::config::ClientConfig;
use versa_core::conversation::{MessageRole, SendMessageRequest};
use versa_core::error::VersaError;
use versa_interaction::HttpApiGateway;

const TOKEN: &str = "tok1";

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid authentication credentials"})),
    )
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "secret" {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": TOKEN,
                "token_type": "bearer",
                "user": {"id": "u1", "name": "Ann", "email": body["email"]},
                "workspace": {"id": "w1", "name": "Ann's Workspace"}
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect email or password"})),
        )
    }
}

async fn verify(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if bearer_ok(&headers) {
        (StatusCode::OK, Json(json!({"valid": true})))
    } else {
        unauthorized()
    }
}

async fn list_assistants(
    headers: HeaderMap,
    Path(workspace_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!([{
            "id": "asst1",
            "workspace_id": workspace_id,
            "name": "Helper",
            "type": "chat",
            "created_at": "2024-05-01T09:30:00.123456"
        }])),
    )
}

async fn create_assistant(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["name"] == "boom" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(Value::Null));
    }
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"detail": [
            {"loc": ["body", "name"], "msg": "field required"},
            {"loc": ["body", "type"], "msg": "invalid type"}
        ]})),
    )
}

async fn send_message(
    Path(conversation_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    Json(json!({
        "user_message": {
            "id": "m1",
            "conversation_id": conversation_id,
            "role": "user",
            "content": body["content"],
            "created_at": "2024-05-01T09:30:00"
        },
        "assistant_message": {
            "id": "m2",
            "conversation_id": conversation_id,
            "role": "assistant",
            "content": "Hi there",
            "created_at": "2024-05-01T09:30:01"
        }
    }))
}

async fn delete_message() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/verify", get(verify))
        .route(
            "/api/workspaces/{id}/assistants",
            get(list_assistants).post(create_assistant),
        )
        .route("/api/conversations/{id}/messages", post(send_message))
        .route(
            "/api/conversations/{id}/messages/{message_id}",
            delete(delete_message),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api", addr)
}

async fn gateway() -> HttpApiGateway {
    let base_url = spawn_server().await;
    HttpApiGateway::new(&ClientConfig::default().with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn test_login_success() {
    let gateway = gateway().await;

    let response = gateway
        .login(&LoginRequest::new("a@b.com", "secret"))
        .await
        .unwrap();

    assert_eq!(response.access_token, TOKEN);
    assert_eq!(response.user.email, "a@b.com");
    assert_eq!(response.workspace.id, "w1");
}

#[tokio::test]
async fn test_login_failure_carries_detail() {
    let gateway = gateway().await;

    let err = gateway
        .login(&LoginRequest::new("a@b.com", "wrong"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message("Login failed"), "Incorrect email or password");
}

#[tokio::test]
async fn test_bearer_header_attached() {
    let gateway = gateway().await;

    gateway.verify(&AuthHeaders::bearer(TOKEN)).await.unwrap();
    let assistants = gateway
        .list_assistants(&AuthHeaders::bearer(TOKEN), "w1")
        .await
        .unwrap();
    assert_eq!(assistants.len(), 1);
    assert_eq!(assistants[0].name, "Helper");

    let err = gateway.verify(&AuthHeaders::none()).await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_send_message_returns_pair() {
    let gateway = gateway().await;

    let exchange = gateway
        .send_message(
            &AuthHeaders::bearer(TOKEN),
            "c1",
            &SendMessageRequest::new("Hello").unwrap(),
        )
        .await
        .unwrap();

    let [user, assistant] = exchange.into_messages();
    assert_eq!(user.role, MessageRole::User);
    assert_eq!(user.content, "Hello");
    assert_eq!(assistant.role, MessageRole::Assistant);
    assert_eq!(assistant.conversation_id, "c1");
}

#[tokio::test]
async fn test_delete_accepts_empty_body() {
    let gateway = gateway().await;

    gateway
        .delete_message(&AuthHeaders::bearer(TOKEN), "c1", "m1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_server_error_without_message() {
    let gateway = gateway().await;

    let err = gateway
        .create_assistant(&AuthHeaders::bearer(TOKEN), "w1", &NewAssistant::new("boom"))
        .await
        .unwrap_err();

    assert_eq!(err, VersaError::server(500, None));
    assert_eq!(
        err.user_message("Failed to create assistant"),
        "Failed to create assistant"
    );
}

#[tokio::test]
async fn test_validation_detail_list_is_joined() {
    let gateway = gateway().await;

    let err = gateway
        .create_assistant(&AuthHeaders::bearer(TOKEN), "w1", &NewAssistant::new("x"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    let message = err.user_message("Failed to create assistant");
    assert!(message.contains("field required"));
    assert!(message.contains("invalid type"));
}

#[tokio::test]
async fn test_transport_error_when_unreachable() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::default().with_base_url(format!("http://{}/api", addr));
    let gateway = HttpApiGateway::new(&config).unwrap();

    let err = gateway.health().await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status(), Some(0));
}
