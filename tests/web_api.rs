//! Web API Tests
//!
//! Integration tests for the auth and file endpoints.

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use cloudstash::backend::{Collections, FileUrls, MemoryBackend};
use cloudstash::config::SessionConfig;
use cloudstash::web::{create_health_router, create_router, AppState};
use cloudstash::Gateway;
use serde_json::{json, Value};
use std::sync::Arc;

/// Create a test server over an in-memory backend.
fn create_test_server() -> (TestServer, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let gateway = Gateway::from_backend(
        backend.clone(),
        Collections {
            users: "users".to_string(),
            files: "files".to_string(),
        },
        FileUrls::new("https://cloud.example.com/v1", "files", "proj"),
    );

    let app_state = Arc::new(
        AppState::new(gateway)
            .with_session_config(SessionConfig {
                secure: false,
                ..SessionConfig::default()
            })
            .with_max_upload_size(1024),
    );
    let router = create_router(app_state, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, backend)
}

/// Sign up and verify, returning the session cookie.
async fn sign_in_user(
    server: &TestServer,
    backend: &MemoryBackend,
    full_name: &str,
    email: &str,
) -> axum_extra::extract::cookie::Cookie<'static> {
    let response = server
        .post("/api/auth/sign-up")
        .json(&json!({ "fullName": full_name, "email": email }))
        .await;
    response.assert_status_ok();
    let account_id = response.json::<Value>()["data"]["accountId"]
        .as_str()
        .unwrap()
        .to_string();

    let otp = backend.pending_otp(email).await.unwrap();
    let response = server
        .post("/api/auth/verify")
        .json(&json!({ "accountId": account_id, "password": otp }))
        .await;
    response.assert_status_ok();
    response.cookie("appwrite-session")
}

async fn upload(
    server: &TestServer,
    cookie: &axum_extra::extract::cookie::Cookie<'static>,
    name: &str,
    content: &'static [u8],
) -> Value {
    let form = MultipartForm::new()
        .add_text("path", "/documents")
        .add_part("file", Part::bytes(content).file_name(name));
    let response = server
        .post("/api/files")
        .add_cookie(cookie.clone())
        .multipart(form)
        .await;
    response.assert_status_ok();
    response.json::<Value>()["data"].clone()
}

#[tokio::test]
async fn test_health() {
    let (server, _) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_verify_sets_session_cookie() {
    let (server, backend) = create_test_server();
    let cookie = sign_in_user(&server, &backend, "Ada Lovelace", "ada@example.com").await;

    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));

    let response = server.get("/api/auth/me").add_cookie(cookie).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["fullName"], "Ada Lovelace");
}

#[tokio::test]
async fn test_me_without_cookie_is_unauthorized() {
    let (server, _) = create_test_server();
    let response = server.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_sign_up_validation() {
    let (server, _) = create_test_server();
    let response = server
        .post("/api/auth/sign-up")
        .json(&json!({ "fullName": "   ", "email": "ada@example.com" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["fullName"].is_array() || body["error"]["details"]["full_name"].is_array());
}

#[tokio::test]
async fn test_verify_wrong_code_uses_form_message() {
    let (server, backend) = create_test_server();
    let response = server
        .post("/api/auth/sign-up")
        .json(&json!({ "fullName": "Ada Lovelace", "email": "ada@example.com" }))
        .await;
    let account_id = response.json::<Value>()["data"]["accountId"]
        .as_str()
        .unwrap()
        .to_string();
    let otp = backend.pending_otp("ada@example.com").await.unwrap();
    let wrong = if otp == "000000" { "111111" } else { "000000" };

    let response = server
        .post("/api/auth/verify")
        .json(&json!({ "accountId": account_id, "password": wrong }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "Failed to verify OTP. Please try again."
    );
}

#[tokio::test]
async fn test_sign_in_unknown_user() {
    let (server, _) = create_test_server();
    let response = server
        .post("/api/auth/sign-in")
        .json(&json!({ "email": "ghost@example.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "Failed to create account. Please try again."
    );
    assert!(!body.to_string().contains("not found"));
}

#[tokio::test]
async fn test_sign_out_ends_session() {
    let (server, backend) = create_test_server();
    let cookie = sign_in_user(&server, &backend, "Ada Lovelace", "ada@example.com").await;

    let response = server
        .post("/api/auth/sign-out")
        .add_cookie(cookie.clone())
        .await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(backend.session_count().await, 0);

    let response = server.get("/api/auth/me").add_cookie(cookie).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_and_list_files() {
    let (server, backend) = create_test_server();
    let cookie = sign_in_user(&server, &backend, "Ada Lovelace", "ada@example.com").await;

    let form = MultipartForm::new()
        .add_text("path", "/documents")
        .add_part("file", Part::bytes(&b"%PDF-1.7"[..]).file_name("report.pdf"));
    let response = server
        .post("/api/files")
        .add_cookie(cookie.clone())
        .multipart(form)
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("x-revalidate-path"), "/documents");
    let file = response.json::<Value>()["data"].clone();
    assert_eq!(file["type"], "document");
    assert_eq!(file["extension"], "pdf");
    assert_eq!(file["size"], 8);

    upload(&server, &cookie, "photo.png", b"png-bytes").await;

    let response = server
        .get("/api/files")
        .add_cookie(cookie.clone())
        .add_query_param("types", "image")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["documents"][0]["name"], "photo.png");

    let response = server
        .get("/api/files")
        .add_cookie(cookie)
        .add_query_param("types", "spreadsheet")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_too_large() {
    let (server, backend) = create_test_server();
    let cookie = sign_in_user(&server, &backend, "Ada Lovelace", "ada@example.com").await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0u8; 2048]).file_name("big.bin"),
    );
    let response = server
        .post("/api/files")
        .add_cookie(cookie)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(backend.blob_count().await, 0);
}

#[tokio::test]
async fn test_files_require_session() {
    let (server, _) = create_test_server();
    let response = server.get("/api/files").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rename_share_and_delete() {
    let (server, backend) = create_test_server();
    let ada = sign_in_user(&server, &backend, "Ada Lovelace", "ada@example.com").await;
    let bob = sign_in_user(&server, &backend, "Bob Builder", "bob@example.com").await;

    let file = upload(&server, &ada, "draft.pdf", b"content").await;
    let id = file["$id"].as_str().unwrap().to_string();

    let response = server
        .patch(&format!("/api/files/{id}/name"))
        .add_cookie(ada.clone())
        .json(&json!({ "name": "final", "extension": "pdf", "path": "/documents" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["name"], "final.pdf");
    assert_eq!(response.header("x-revalidate-path"), "/documents");

    let response = server
        .get("/api/files")
        .add_cookie(bob.clone())
        .await;
    assert_eq!(response.json::<Value>()["data"]["total"], 0);

    let response = server
        .put(&format!("/api/files/{id}/users"))
        .add_cookie(ada.clone())
        .json(&json!({ "emails": ["Bob@Example.com"], "path": "/shared" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"]["users"],
        json!(["bob@example.com"])
    );

    let response = server.get("/api/files").add_cookie(bob).await;
    assert_eq!(response.json::<Value>()["data"]["total"], 1);

    let response = server
        .delete(&format!("/api/files/{id}"))
        .add_cookie(ada)
        .add_query_param("path", "/documents")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["status"], "success");
    assert_eq!(backend.blob_count().await, 0);
    assert_eq!(backend.document_count("files").await, 0);
}

#[tokio::test]
async fn test_other_user_cannot_change_file() {
    let (server, backend) = create_test_server();
    let ada = sign_in_user(&server, &backend, "Ada Lovelace", "ada@example.com").await;
    let bob = sign_in_user(&server, &backend, "Bob Builder", "bob@example.com").await;

    let file = upload(&server, &ada, "secret.pdf", b"content").await;
    let id = file["$id"].as_str().unwrap().to_string();
    let blob_id = file["bucketFileId"].as_str().unwrap().to_string();

    // A blob id in the query string is ignored.
    let response = server
        .delete(&format!("/api/files/{id}"))
        .add_cookie(bob.clone())
        .add_query_param("bucketFileId", &blob_id)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .patch(&format!("/api/files/{id}/name"))
        .add_cookie(bob.clone())
        .json(&json!({ "name": "stolen", "extension": "pdf" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .put(&format!("/api/files/{id}/users"))
        .add_cookie(bob.clone())
        .json(&json!({ "emails": ["bob@example.com"] }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Sharing lets Bob see the file but not change it.
    server
        .put(&format!("/api/files/{id}/users"))
        .add_cookie(ada.clone())
        .json(&json!({ "emails": ["bob@example.com"] }))
        .await
        .assert_status_ok();

    let response = server
        .patch(&format!("/api/files/{id}/name"))
        .add_cookie(bob.clone())
        .json(&json!({ "name": "stolen", "extension": "pdf" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"]["code"], "FORBIDDEN");

    let response = server
        .delete(&format!("/api/files/{id}"))
        .add_cookie(bob.clone())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // A delete of Bob's own file naming Ada's blob removes only Bob's blob.
    let own = upload(&server, &bob, "mine.txt", b"mine").await;
    let own_id = own["$id"].as_str().unwrap().to_string();
    let response = server
        .delete(&format!("/api/files/{own_id}"))
        .add_cookie(bob.clone())
        .add_query_param("bucketFileId", &blob_id)
        .await;
    response.assert_status_ok();

    assert_eq!(backend.blob_count().await, 1);
    assert_eq!(backend.document_count("files").await, 1);
    let response = server.get("/api/files").add_cookie(ada).await;
    let body: Value = response.json();
    assert_eq!(body["data"]["documents"][0]["name"], "secret.pdf");
    assert_eq!(body["data"]["documents"][0]["bucketFileId"], blob_id);
}
