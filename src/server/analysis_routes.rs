//! Analysis endpoints: image and song analysis, history, public feed and visibility.

use super::session::Session;
use super::state::{GuardedAnalysisStore, GuardedOrchestrator, ServerState};
use super::ServerConfig;
use crate::analysis::{AnalysisError, AnalysisRequest, AnalysisResult, InputError};
use crate::analysis_store::NewAnalysis;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

pub const DEFAULT_PUBLIC_FEED_LIMIT: usize = 10;
pub const IMAGE_FIELD_NAME: &str = "image";

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
        .into_response()
}

fn analysis_error_response(err: AnalysisError) -> Response {
    match err {
        AnalysisError::Input(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        AnalysisError::Prompt(e) => {
            error!("Analysis aborted: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing analysis")
        }
    }
}

fn internal_error(context: &str, err: anyhow::Error) -> Response {
    error!("{}: {:#}", context, err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SongAnalysisBody {
    #[serde(default)]
    song_title: String,
}

#[derive(Deserialize, Debug)]
struct PublicFeedQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GuestImageAnalysis {
    image_id: String,
    #[serde(flatten)]
    result: AnalysisResult,
    created_at: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GuestSongAnalysis {
    song_title: String,
    #[serde(flatten)]
    result: AnalysisResult,
    created_at: i64,
}

/// Picks the MIME type of an upload: sniffed from the bytes when possible,
/// otherwise whatever the client declared.
pub fn detect_image_mime(bytes: &[u8], declared: Option<&str>) -> String {
    match infer::get(bytes) {
        Some(kind) if kind.mime_type().starts_with("image/") => kind.mime_type().to_string(),
        _ => declared.unwrap_or_default().to_string(),
    }
}

/// Reads the `image` field of a multipart upload into an analysis request.
async fn read_image_request(mut multipart: Multipart) -> Result<AnalysisRequest, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read multipart upload: {}", e);
                return Err(error_response(e.status(), e.body_text()));
            }
        };
        if field.name() != Some(IMAGE_FIELD_NAME) {
            continue;
        }
        let declared = field.content_type().map(|s| s.to_string());
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                warn!("Failed to read image data: {}", e);
                return Err(error_response(e.status(), e.body_text()));
            }
        };
        let mime = detect_image_mime(&bytes, declared.as_deref());
        debug!("Received image upload of {} bytes as {}", bytes.len(), mime);
        return AnalysisRequest::image(bytes, &mime)
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()));
    }
    Err(error_response(
        StatusCode::BAD_REQUEST,
        InputError::EmptyImage.to_string(),
    ))
}

async fn run_and_store(
    orchestrator: &GuardedOrchestrator,
    store: &GuardedAnalysisStore,
    user_id: usize,
    request: AnalysisRequest,
) -> Response {
    let outcome = match orchestrator.analyze(&request).await {
        Ok(outcome) => outcome,
        Err(e) => return analysis_error_response(e),
    };
    let new_analysis = NewAnalysis {
        user_id: Some(user_id),
        content_type: request.modality(),
        song_title: request.song_title().map(str::to_string),
        result: outcome.result,
        is_public: false,
    };
    let stored = store
        .create_analysis(&new_analysis)
        .and_then(|id| store.get_analysis(&id));
    match stored {
        Ok(Some(analysis)) => Json(analysis).into_response(),
        Ok(None) => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error storing analysis"),
        Err(e) => internal_error("Error storing analysis", e),
    }
}

async fn analyze_image(
    session: Session,
    State(orchestrator): State<GuardedOrchestrator>,
    State(store): State<GuardedAnalysisStore>,
    multipart: Multipart,
) -> Response {
    let request = match read_image_request(multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_and_store(&orchestrator, &store, session.user_id, request).await
}

async fn analyze_image_guest(
    State(orchestrator): State<GuardedOrchestrator>,
    multipart: Multipart,
) -> Response {
    let request = match read_image_request(multipart).await {
        Ok(request) => request,
        Err(response) => return response,
    };
    match orchestrator.analyze(&request).await {
        Ok(outcome) => Json(GuestImageAnalysis {
            image_id: uuid::Uuid::new_v4().to_string(),
            result: outcome.result,
            created_at: chrono::Utc::now().timestamp(),
        })
        .into_response(),
        Err(e) => analysis_error_response(e),
    }
}

fn song_request(body: SongAnalysisBody) -> Result<AnalysisRequest, Response> {
    AnalysisRequest::song(body.song_title)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))
}

async fn analyze_song(
    session: Session,
    State(orchestrator): State<GuardedOrchestrator>,
    State(store): State<GuardedAnalysisStore>,
    Json(body): Json<SongAnalysisBody>,
) -> Response {
    let request = match song_request(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    run_and_store(&orchestrator, &store, session.user_id, request).await
}

async fn analyze_song_guest(
    State(orchestrator): State<GuardedOrchestrator>,
    Json(body): Json<SongAnalysisBody>,
) -> Response {
    let request = match song_request(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match orchestrator.analyze(&request).await {
        Ok(outcome) => Json(GuestSongAnalysis {
            song_title: request.song_title().unwrap_or_default().to_string(),
            result: outcome.result,
            created_at: chrono::Utc::now().timestamp(),
        })
        .into_response(),
        Err(e) => analysis_error_response(e),
    }
}

async fn get_my_analyses(session: Session, State(store): State<GuardedAnalysisStore>) -> Response {
    match store.get_user_analyses(session.user_id) {
        Ok(analyses) => Json(analyses).into_response(),
        Err(e) => internal_error("Error fetching analyses", e),
    }
}

/// Clamps a requested feed size into `1..=max`.
pub fn resolve_feed_limit(requested: Option<usize>, max: usize) -> usize {
    requested
        .unwrap_or(DEFAULT_PUBLIC_FEED_LIMIT)
        .clamp(1, max.max(1))
}

async fn get_public_analyses(
    State(config): State<ServerConfig>,
    State(store): State<GuardedAnalysisStore>,
    Query(query): Query<PublicFeedQuery>,
) -> Response {
    let limit = resolve_feed_limit(query.limit, config.public_feed_max);
    match store.get_public_analyses(limit) {
        Ok(analyses) => Json(analyses).into_response(),
        Err(e) => internal_error("Error fetching public analyses", e),
    }
}

async fn get_analysis(
    session: Option<Session>,
    State(store): State<GuardedAnalysisStore>,
    Path(id): Path<String>,
) -> Response {
    let analysis = match store.get_analysis(&id) {
        Ok(Some(analysis)) => analysis,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Analysis not found"),
        Err(e) => return internal_error("Error fetching analysis", e),
    };
    let visible = analysis.is_public
        || session
            .map(|s| analysis.is_owned_by(s.user_id))
            .unwrap_or(false);
    if visible {
        Json(analysis).into_response()
    } else {
        // Private records are indistinguishable from missing ones
        error_response(StatusCode::NOT_FOUND, "Analysis not found")
    }
}

async fn toggle_public(
    session: Session,
    State(store): State<GuardedAnalysisStore>,
    Path(id): Path<String>,
) -> Response {
    let analysis = match store.get_analysis(&id) {
        Ok(Some(analysis)) => analysis,
        Ok(None) => return error_response(StatusCode::NOT_FOUND, "Analysis not found"),
        Err(e) => return internal_error("Error fetching analysis", e),
    };
    if !analysis.is_owned_by(session.user_id) {
        return error_response(StatusCode::FORBIDDEN, "Not the owner of this analysis");
    }
    match store.set_analysis_visibility(&id, !analysis.is_public) {
        Ok(Some(updated)) => {
            debug!("Analysis {} is now public={}", id, updated.is_public);
            Json(updated).into_response()
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Analysis not found"),
        Err(e) => internal_error("Error updating analysis", e),
    }
}

pub fn make_analysis_routes(state: ServerState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let upload_routes: Router = Router::new()
        .route("/image", post(analyze_image))
        .route("/image/guest", post(analyze_image_guest))
        .layer(upload_limit)
        .with_state(state.clone());

    Router::new()
        .route("/song", post(analyze_song))
        .route("/song/guest", post(analyze_song_guest))
        .route("/mine", get(get_my_analyses))
        .route("/public", get(get_public_analyses))
        .route("/{id}", get(get_analysis))
        .route("/{id}/toggle-public", post(toggle_public))
        .with_state(state)
        .merge(upload_routes)
}
