use anyhow::{Context, Result};
use std::{future::Future, sync::Arc, time::Duration, time::Instant};

use tracing::{debug, error, info};

use crate::analysis::AnalysisOrchestrator;
use crate::analysis_store::AnalysisStore;
use crate::user::{AuthToken, AuthTokenValue, RegistrationError, UserManager};
use tower_http::services::ServeDir;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::analysis_routes::make_analysis_routes;
use super::metrics::metrics_handler;
use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub providers: Vec<String>,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct RegisterBody {
    #[serde(alias = "user_handle")]
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

#[derive(Deserialize)]
struct LoginBody {
    #[serde(alias = "user_handle")]
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginSuccessResponse {
    token: String,
    user_id: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    user_id: usize,
    username: String,
    email: Option<String>,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        providers: state.orchestrator.provider_names(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

fn session_cookie(token: &AuthTokenValue) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        COOKIE_SESSION_TOKEN_KEY, token.0
    ))
    .ok()
}

/// 201 response carrying the token both in the body and as a cookie.
fn token_created_response(token: AuthToken) -> Response {
    let Some(cookie_value) = session_cookie(&token.value) else {
        error!("Generated a session token that is not a valid header value");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let body = LoginSuccessResponse {
        token: token.value.0,
        user_id: token.user_id,
    };
    (
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie_value)],
        Json(body),
    )
        .into_response()
}

async fn register(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<RegisterBody>,
) -> Response {
    debug!("register() called for {}", body.username);
    let user_id = match user_manager.register(&body.username, body.email.as_deref(), &body.password)
    {
        Ok(id) => id,
        Err(RegistrationError::HandleTaken) => {
            return (StatusCode::CONFLICT, RegistrationError::HandleTaken.to_string())
                .into_response()
        }
        Err(RegistrationError::Internal(e)) => {
            error!("Error registering user: {:#}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    match user_manager.generate_auth_token(user_id) {
        Ok(token) => token_created_response(token),
        Err(err) => {
            error!("Error with auth token generation: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    debug!("login() called for {}", body.username);
    match user_manager.login(&body.username, &body.password) {
        Ok(Some(token)) => token_created_response(token),
        Ok(None) => StatusCode::UNAUTHORIZED.into_response(),
        Err(err) => {
            error!("Error during login: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn logout(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    match user_manager.delete_auth_token(&AuthTokenValue(session.token)) {
        Ok(_) => {
            // Expire the cookie right away
            let cookie = format!(
                "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
                COOKIE_SESSION_TOKEN_KEY
            );
            (StatusCode::OK, [(header::SET_COOKIE, cookie)]).into_response()
        }
        Err(err) => {
            error!("Error deleting auth token: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn get_session(State(user_manager): State<GuardedUserManager>, session: Session) -> Response {
    match user_manager.get_user(session.user_id) {
        Ok(Some(user)) => Json(SessionResponse {
            user_id: user.id,
            username: user.handle,
            email: user.email,
        })
        .into_response(),
        Ok(None) => StatusCode::UNAUTHORIZED.into_response(),
        Err(err) => {
            error!("Error loading session user: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        user_manager: Arc<UserManager>,
        analysis_store: Arc<dyn AnalysisStore>,
        orchestrator: Arc<AnalysisOrchestrator>,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            user_manager,
            analysis_store,
            orchestrator,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    user_manager: Arc<UserManager>,
    analysis_store: Arc<dyn AnalysisStore>,
    orchestrator: Arc<AnalysisOrchestrator>,
) -> Router {
    let state = ServerState::new(config.clone(), user_manager, analysis_store, orchestrator);

    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/session", get(get_session))
        .with_state(state.clone());

    let analysis_routes = make_analysis_routes(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)).with_state(state.clone()),
    };

    home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/analysis", analysis_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves the API until `shutdown` resolves, with the metrics endpoint on its own port.
pub async fn run_server_with_shutdown<F>(
    config: ServerConfig,
    user_manager: Arc<UserManager>,
    analysis_store: Arc<dyn AnalysisStore>,
    orchestrator: Arc<AnalysisOrchestrator>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, user_manager, analysis_store, orchestrator);

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn run_server(
    config: ServerConfig,
    user_manager: Arc<UserManager>,
    analysis_store: Arc<dyn AnalysisStore>,
    orchestrator: Arc<AnalysisOrchestrator>,
) -> Result<()> {
    run_server_with_shutdown(config, user_manager, analysis_store, orchestrator, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutting down...");
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Persona;
    use crate::analysis_store::SqliteAnalysisStore;
    use crate::user::SqliteUserStore;
    use axum::{body::Body, http::Request};
    use tempfile::TempDir;
    use tower::ServiceExt; // for `oneshot`

    fn make_test_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let user_store = SqliteUserStore::new(temp_dir.path().join("user.db")).unwrap();
        let analysis_store =
            SqliteAnalysisStore::new(temp_dir.path().join("analysis.db")).unwrap();
        let app = make_app(
            ServerConfig::default(),
            Arc::new(UserManager::new(Arc::new(user_store))),
            Arc::new(analysis_store),
            Arc::new(AnalysisOrchestrator::new(Persona::auranic(), vec![])),
        );
        (app, temp_dir)
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn responds_unauthorized_on_protected_routes() {
        let (app, _dir) = make_test_app();

        let protected_routes = vec![
            ("GET", "/v1/auth/logout"),
            ("GET", "/v1/auth/session"),
            ("GET", "/v1/analysis/mine"),
            ("POST", "/v1/analysis/some-id/toggle-public"),
        ];

        for (method, route) in protected_routes.into_iter() {
            let request = Request::builder()
                .method(method)
                .uri(route)
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", route);
        }
    }

    #[tokio::test]
    async fn home_reports_stats() {
        let (app, _dir) = make_test_app();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["uptime"], "0d 00:00:00");
        assert!(json["providers"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn guest_song_analysis_works_without_providers() {
        let (app, _dir) = make_test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/v1/analysis/song/guest")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"songTitle":"Midnight Drive"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["songTitle"], "Midnight Drive");
        let aura = json["auraScore"].as_u64().unwrap();
        assert!((1..=100).contains(&aura));
    }
}
