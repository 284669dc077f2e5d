//! HTTP request handlers

use super::assets::get_index_html;
use super::sse::sse_stream;
use super::types::{
    DraftRequest, ErrorResponse, SubmitRequest, SubmitResponse, SuccessResponse, ThemeRequest,
    ThemesResponse,
};
use super::AppState;
use crate::runtime::SessionError;
use crate::session::{Event, SessionSnapshot, Theme};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the chat page
        .route("/", get(serve_index))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/:id",
            get(get_session).delete(delete_session),
        )
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // User actions
        .route("/api/sessions/:id/draft", post(update_draft))
        .route("/api/sessions/:id/submit", post(submit))
        .route("/api/sessions/:id/clear", post(clear_session))
        .route("/api/sessions/:id/theme", post(change_theme))
        .route("/api/themes", get(list_themes))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Page
// ============================================================

async fn serve_index() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.sessions.create().await)
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.snapshot(&id).await?))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.destroy(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Subscribe before reading the snapshot so no update is missed
    let (snapshot, rx) = state.sessions.subscribe(&id).await?;
    Ok(sse_stream(snapshot, rx))
}

// ============================================================
// User Actions
// ============================================================

async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let outcome = state
        .sessions
        .dispatch(&id, Event::DraftChanged { text: req.text })
        .await?;
    Ok(Json(outcome.snapshot))
}

async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let outcome = state
        .sessions
        .dispatch(&id, Event::Submit { text: req.text })
        .await?;

    if let Some(reason) = &outcome.rejected {
        tracing::debug!(session_id = %id, reason = %reason, "Submission ignored");
    }

    Ok(Json(SubmitResponse {
        accepted: outcome.accepted(),
        reason: outcome.rejected.map(|r| r.to_string()),
        snapshot: outcome.snapshot,
    }))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let outcome = state.sessions.dispatch(&id, Event::Clear).await?;
    Ok(Json(outcome.snapshot))
}

async fn change_theme(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let theme: Theme = req
        .theme
        .parse()
        .map_err(|e: crate::session::ThemeParseError| AppError::BadRequest(e.to_string()))?;
    let outcome = state
        .sessions
        .dispatch(&id, Event::ThemeChanged { theme })
        .await?;
    Ok(Json(outcome.snapshot))
}

async fn list_themes() -> Json<ThemesResponse> {
    Json(ThemesResponse {
        themes: Theme::ALL.iter().map(|t| t.as_str()).collect(),
        default: Theme::default().as_str(),
    })
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("cognibot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => AppError::NotFound(err.to_string()),
            SessionError::Closed => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
