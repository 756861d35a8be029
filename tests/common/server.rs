//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own databases.

use super::constants::*;
use super::fixtures::create_test_db_with_users;
use auranic_server::analysis::{AnalysisOrchestrator, Persona};
use auranic_server::analysis_store::{AnalysisStore, SqliteAnalysisStore};
use auranic_server::llm::ScoringProvider;
use auranic_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use auranic_server::user::{SqliteUserStore, UserManager};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated databases
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Analysis store for direct database access in tests
    pub analysis_store: Arc<dyn AnalysisStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with no scoring providers, so every analysis comes from the fallback.
    pub async fn spawn() -> Self {
        Self::spawn_with_providers(vec![]).await
    }

    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary database directory with test users
    /// 2. Opens the user and analysis stores
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if setup fails or the server doesn't become ready within timeout.
    pub async fn spawn_with_providers(providers: Vec<Arc<dyn ScoringProvider>>) -> Self {
        let (temp_db_dir, db_dir) =
            create_test_db_with_users().expect("Failed to create test database");

        let user_store =
            SqliteUserStore::new(db_dir.join("user.db")).expect("Failed to open user store");
        let user_manager = Arc::new(UserManager::new(Arc::new(user_store)));
        let analysis_store: Arc<dyn AnalysisStore> = Arc::new(
            SqliteAnalysisStore::new(db_dir.join("analysis.db"))
                .expect("Failed to open analysis store"),
        );
        let orchestrator = Arc::new(
            AnalysisOrchestrator::new(Persona::auranic(), providers)
                .with_provider_timeout(Duration::from_millis(TEST_PROVIDER_TIMEOUT_MS)),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
            public_feed_max: TEST_PUBLIC_FEED_MAX,
            ..Default::default()
        };

        let app = make_app(config, user_manager, analysis_store.clone(), orchestrator);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            analysis_store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(10)).await,
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
