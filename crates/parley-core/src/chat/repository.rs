//! ChatRepository trait definition.
//!
//! Provides CRUD operations for chat sessions and their messages.

use chrono::{DateTime, Utc};
use parley_types::chat::{ChatMessage, ChatSession, SessionSummary};
use parley_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
///
/// Implementations live in parley-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// Create a new chat session.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a chat session by its unique ID.
    fn get_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Persist the mutable fields (`title`, `updated_at`) of an existing session.
    ///
    /// Returns `RepositoryError::NotFound` if the session does not exist.
    fn update_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List all sessions, most recently updated first, each with its message
    /// count and latest message.
    fn list_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SessionSummary>, RepositoryError>> + Send;

    /// Delete a chat session and its messages.
    ///
    /// Returns `RepositoryError::NotFound` if the session does not exist.
    fn delete_session(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append a message to its session atomically.
    ///
    /// In a single transaction: inserts `message`, advances the session's
    /// `updated_at` to `touched_at` (never moving it backwards), and, when `auto_title` is given, replaces
    /// the title only if it still equals `DEFAULT_SESSION_TITLE` and `message`
    /// is the session's only user-role message. Returns the session as stored
    /// after the transaction.
    ///
    /// Returns `RepositoryError::NotFound` if the session does not exist.
    fn append_message(
        &self,
        message: &ChatMessage,
        touched_at: DateTime<Utc>,
        auto_title: Option<&str>,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get all messages for a session, ordered by created_at ASC.
    fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
