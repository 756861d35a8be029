//! End-to-end tests for authentication endpoints
//!
//! Tests registration, login, logout, session management, and authentication requirements.

mod common;

use common::{TestClient, TestServer, TEST_PASS, TEST_USER};
use reqwest::StatusCode;

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_USER, TEST_PASS).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session_token="));
    assert!(cookie.contains("HttpOnly"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["token"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_login_with_invalid_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(TEST_USER, "wrong_password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_nonexistent_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login("nonexistent_user", "password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_returns_current_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], TEST_USER);
    assert_eq!(body["email"], "test@example.com");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated(server.base_url.clone()).await;

    let response = client.get_my_analyses().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.get_my_analyses().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_in_authorization_header() {
    let server = TestServer::spawn().await;
    let login_client = TestClient::new(server.base_url.clone());
    let body: serde_json::Value = login_client
        .login(TEST_USER, TEST_PASS)
        .await
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap();

    let bare = reqwest::Client::new();
    let response = bare
        .get(format!("{}/v1/auth/session", server.base_url))
        .header("Authorization", token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = bare
        .get(format!("{}/v1/auth/session", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = bare
        .get(format!("{}/v1/auth/session", server.base_url))
        .header("Authorization", "not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_logs_in_new_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .register("newcomer", Some("new@example.com"), "s3cret-pass")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["username"], "newcomer");

    let other = TestClient::new(server.base_url.clone());
    let response = other.login("newcomer", "s3cret-pass").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_rejects_taken_handle_and_bad_input() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.register(TEST_USER, None, "another-pass").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client.register("shortpass", None, "abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.register("   ", None, "long-enough").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(client.get_session().await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(client.logout().await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(client.get_my_analyses().await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        client.analyze_song("Midnight Drive").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client.toggle_public("anything").await.status(),
        StatusCode::UNAUTHORIZED
    );
}
