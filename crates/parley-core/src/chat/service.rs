//! Chat service implementing the session operations.
//!
//! ChatService layers session CRUD, message append (with timestamp and
//! auto-title side effects), and message listing on top of a
//! `ChatRepository`.

use parley_types::chat::{
    AppendMessageRequest, ChatMessage, ChatSession, CreateSessionRequest, SessionDetail,
    SessionSummary, UpdateSessionRequest, timestamp_now,
};
use parley_types::error::ChatError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::repository::ChatRepository;
use crate::chat::title::{derive_title, validate_title};

/// Message returned when an append request lacks a role or content.
pub const MISSING_FIELDS_MESSAGE: &str = "Both role and content are required";

/// Session operations over a chat repository.
///
/// Generic over `ChatRepository` to maintain clean architecture
/// (parley-core never depends on parley-infra).
pub struct ChatService<C: ChatRepository> {
    chat_repo: C,
}

impl<C: ChatRepository> ChatService<C> {
    /// Create a new chat service with the given repository.
    pub fn new(chat_repo: C) -> Self {
        Self { chat_repo }
    }

    // --- Session lifecycle ---

    /// List every session in its abbreviated form, most recently updated first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ChatError> {
        Ok(self.chat_repo.list_sessions().await?)
    }

    /// Create a session owned by `owner` (always `None` while authentication
    /// is disabled). A missing title falls back to the default.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
        owner: Option<Uuid>,
    ) -> Result<SessionDetail, ChatError> {
        if let Some(title) = &request.title {
            validate_title(title)?;
        }

        let mut session = ChatSession::new(request.title);
        session.user_id = owner;

        let created = self.chat_repo.create_session(&session).await?;
        info!(session_id = %created.id, "Session created");
        Ok(SessionDetail::new(created, Vec::new()))
    }

    /// Get a session together with its messages.
    pub async fn get_session(&self, session_id: &Uuid) -> Result<SessionDetail, ChatError> {
        let session = self.require_session(session_id).await?;
        let messages = self.chat_repo.get_messages(session_id).await?;
        Ok(SessionDetail::new(session, messages))
    }

    /// Apply an update to a session's writable fields.
    ///
    /// Omitted fields are left unchanged, so PUT and PATCH share this path.
    /// `updated_at` is refreshed on every successful update.
    #[tracing::instrument(skip(self, session_id, request), fields(session_id = %session_id))]
    pub async fn update_session(
        &self,
        session_id: &Uuid,
        request: UpdateSessionRequest,
    ) -> Result<SessionDetail, ChatError> {
        let mut session = self.require_session(session_id).await?;

        if let Some(title) = request.title {
            validate_title(&title)?;
            session.title = title;
        }
        session.updated_at = timestamp_now().max(session.updated_at);

        self.chat_repo.update_session(&session).await?;
        info!("Session updated");

        let messages = self.chat_repo.get_messages(session_id).await?;
        Ok(SessionDetail::new(session, messages))
    }

    /// Delete a session and, by cascade, all of its messages.
    #[tracing::instrument(skip(self, session_id), fields(session_id = %session_id))]
    pub async fn delete_session(&self, session_id: &Uuid) -> Result<(), ChatError> {
        self.chat_repo.delete_session(session_id).await?;
        info!("Session deleted");
        Ok(())
    }

    // --- Messages ---

    /// Append a message to a session.
    ///
    /// Bumps the session's `updated_at` and, for the first user message of a
    /// session still titled with the default, derives the title from the
    /// message content.
    #[tracing::instrument(skip(self, session_id, request), fields(session_id = %session_id))]
    pub async fn append_message(
        &self,
        session_id: &Uuid,
        request: AppendMessageRequest,
    ) -> Result<ChatMessage, ChatError> {
        let session = self.require_session(session_id).await?;

        let (role, content) = match (request.role, request.content) {
            (Some(role), Some(content)) if !role.is_empty() && !content.is_empty() => {
                (role, content)
            }
            _ => return Err(ChatError::BadRequest(MISSING_FIELDS_MESSAGE.to_string())),
        };

        let message = ChatMessage::new(*session_id, role, content);
        let touched_at = message.created_at.max(session.updated_at);

        let auto_title = (message.is_user() && session.has_default_title())
            .then(|| derive_title(&message.content));

        let stored = self
            .chat_repo
            .append_message(&message, touched_at, auto_title.as_deref())
            .await?;

        if stored.title != session.title {
            info!(title = %stored.title, "Session auto-titled from first user message");
        }
        debug!(message_id = %message.id, role = %message.role, "Message appended");

        Ok(message)
    }

    /// List a session's messages in chronological order.
    pub async fn list_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, ChatError> {
        self.require_session(session_id).await?;
        Ok(self.chat_repo.get_messages(session_id).await?)
    }

    /// Look up a session, failing with `ChatError::NotFound` if it does not exist.
    pub async fn require_session(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        self.chat_repo
            .get_session(session_id)
            .await?
            .ok_or(ChatError::NotFound)
    }
}
