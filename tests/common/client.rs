//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per server endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client logged in as the given user
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated_as(base_url: String, handle: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(handle, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Authentication of {} failed: {:?}",
            handle,
            response.text().await
        );

        client
    }

    /// Creates a client pre-authenticated as the regular test user
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, TEST_USER, TEST_PASS).await
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/register
    pub async fn register(&self, username: &str, email: Option<&str>, password: &str) -> Response {
        self.client
            .post(format!("{}/v1/auth/register", self.base_url))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Register request failed")
    }

    /// POST /v1/auth/login
    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/v1/auth/login", self.base_url))
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// GET /v1/auth/session
    pub async fn get_session(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/session", self.base_url))
            .send()
            .await
            .expect("Get session request failed")
    }

    // ========================================================================
    // Analysis Endpoints
    // ========================================================================

    async fn post_image(&self, path: &str, bytes: &[u8], mime: &str) -> Response {
        let part = Part::bytes(bytes.to_vec())
            .file_name("upload")
            .mime_str(mime)
            .expect("Invalid mime type");
        let form = Form::new().part("image", part);
        self.client
            .post(format!("{}{}", self.base_url, path))
            .multipart(form)
            .send()
            .await
            .expect("Image analysis request failed")
    }

    /// POST /v1/analysis/image
    pub async fn analyze_image(&self, bytes: &[u8], mime: &str) -> Response {
        self.post_image("/v1/analysis/image", bytes, mime).await
    }

    /// POST /v1/analysis/image/guest
    pub async fn analyze_image_guest(&self, bytes: &[u8], mime: &str) -> Response {
        self.post_image("/v1/analysis/image/guest", bytes, mime)
            .await
    }

    /// POST /v1/analysis/image with a multipart form lacking the image field
    pub async fn analyze_image_without_file(&self) -> Response {
        let form = Form::new().text("note", "no image here");
        self.client
            .post(format!("{}/v1/analysis/image", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Image analysis request failed")
    }

    /// POST /v1/analysis/song
    pub async fn analyze_song(&self, title: &str) -> Response {
        self.client
            .post(format!("{}/v1/analysis/song", self.base_url))
            .json(&json!({ "songTitle": title }))
            .send()
            .await
            .expect("Song analysis request failed")
    }

    /// POST /v1/analysis/song/guest
    pub async fn analyze_song_guest(&self, title: &str) -> Response {
        self.client
            .post(format!("{}/v1/analysis/song/guest", self.base_url))
            .json(&json!({ "songTitle": title }))
            .send()
            .await
            .expect("Guest song analysis request failed")
    }

    /// GET /v1/analysis/mine
    pub async fn get_my_analyses(&self) -> Response {
        self.client
            .get(format!("{}/v1/analysis/mine", self.base_url))
            .send()
            .await
            .expect("Get my analyses request failed")
    }

    /// GET /v1/analysis/public
    pub async fn get_public_analyses(&self, limit: Option<usize>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/v1/analysis/public", self.base_url));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        request
            .send()
            .await
            .expect("Get public analyses request failed")
    }

    /// GET /v1/analysis/{id}
    pub async fn get_analysis(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/analysis/{}", self.base_url, id))
            .send()
            .await
            .expect("Get analysis request failed")
    }

    /// POST /v1/analysis/{id}/toggle-public
    pub async fn toggle_public(&self, id: &str) -> Response {
        self.client
            .post(format!("{}/v1/analysis/{}/toggle-public", self.base_url, id))
            .send()
            .await
            .expect("Toggle public request failed")
    }
}
