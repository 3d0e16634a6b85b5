//! Session and message HTTP handlers.
//!
//! Endpoints (under `/api/chat`):
//! - GET       /sessions/                     - List sessions (abbreviated)
//! - POST      /sessions/                     - Create a session
//! - GET       /sessions/{id}/                - Get a session with its messages
//! - PUT/PATCH /sessions/{id}/                - Update a session
//! - DELETE    /sessions/{id}/                - Delete a session and its messages
//! - POST      /sessions/{id}/messages/       - Append a message
//! - GET       /sessions/{id}/messages_list/  - List a session's messages

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use parley_types::chat::{
    AppendMessageRequest, ChatMessage, CreateSessionRequest, SessionDetail, SessionSummary,
    UpdateSessionRequest,
};
use parley_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::extractors::body::ApiBody;
use crate::state::AppState;

/// Parse a session id from a path parameter.
///
/// A value that is not a UUID cannot name a stored session, so it is
/// reported as not found rather than as a malformed request.
fn parse_session_id(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>().map_err(|_| AppError::Chat(ChatError::NotFound))
}

/// Unwrap a request body, reporting an unknown session ahead of a malformed
/// body.
async fn body_for_session<T>(
    state: &AppState,
    session_id: &Uuid,
    body: Result<ApiBody<T>, AppError>,
) -> Result<T, AppError> {
    match body {
        Ok(ApiBody(body)) => Ok(body),
        Err(rejection) => {
            state.chat_service.require_session(session_id).await?;
            Err(rejection)
        }
    }
}

/// GET /api/chat/sessions/ - List all sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    let sessions = state.chat_service.list_sessions().await?;
    Ok(Json(sessions))
}

/// POST /api/chat/sessions/ - Create a session.
pub async fn create_session(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiBody(body): ApiBody<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionDetail>), AppError> {
    let session = state
        .chat_service
        .create_session(body, user.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/chat/sessions/{id}/ - Get a session with its messages.
pub async fn get_session(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<SessionDetail>, AppError> {
    let sid = parse_session_id(&session_id)?;
    let session = state.chat_service.get_session(&sid).await?;
    Ok(Json(session))
}

/// PUT/PATCH /api/chat/sessions/{id}/ - Update a session.
pub async fn update_session(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(session_id): Path<String>,
    body: Result<ApiBody<UpdateSessionRequest>, AppError>,
) -> Result<Json<SessionDetail>, AppError> {
    let sid = parse_session_id(&session_id)?;
    let body = body_for_session(&state, &sid, body).await?;
    let session = state.chat_service.update_session(&sid, body).await?;
    Ok(Json(session))
}

/// DELETE /api/chat/sessions/{id}/ - Delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let sid = parse_session_id(&session_id)?;
    state.chat_service.delete_session(&sid).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/chat/sessions/{id}/messages/ - Append a message to a session.
pub async fn append_message(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(session_id): Path<String>,
    body: Result<ApiBody<AppendMessageRequest>, AppError>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let sid = parse_session_id(&session_id)?;
    let body = body_for_session(&state, &sid, body).await?;
    let message = state.chat_service.append_message(&sid, body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/chat/sessions/{id}/messages_list/ - List a session's messages.
pub async fn list_messages(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let sid = parse_session_id(&session_id)?;
    let messages = state.chat_service.list_messages(&sid).await?;
    Ok(Json(messages))
}
