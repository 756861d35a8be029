//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, SAMPLE_SONG_TITLE};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_song_analysis() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::authenticated(server.base_url.clone()).await;
//!
//!     let response = client.analyze_song(SAMPLE_SONG_TITLE).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

#![allow(dead_code)]

mod client;
mod constants;
mod fixtures;
mod mock_llm;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{Script, ScriptedProvider};
#[allow(unused_imports)]
pub use mock_llm::{MockLlmServer, MockReply};
#[allow(unused_imports)]
pub use server::TestServer;
