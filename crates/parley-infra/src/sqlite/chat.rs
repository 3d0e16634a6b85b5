//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `parley-core` using sqlx with split read/write pools:
//! raw queries, private Row structs, reads on the reader pool and writes on the
//! single-connection writer pool.

use chrono::{DateTime, SecondsFormat, Utc};
use parley_core::chat::repository::ChatRepository;
use parley_types::chat::{ChatMessage, ChatSession, DEFAULT_SESSION_TITLE, SessionSummary, roles};
use parley_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    id: String,
    title: String,
    user_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            user_id: row.try_get("user_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;
        let user_id = self
            .user_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid user_id: {e}")))?;

        Ok(ChatSession {
            id,
            title: self.title,
            user_id,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct ChatMessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| RepositoryError::Query(format!("invalid session_id: {e}")))?;

        Ok(ChatMessage {
            id,
            session_id,
            role: self.role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// Internal row type for the session index: a session row joined with its
/// message count and latest message (`last_*` columns, NULL when empty).
struct SessionSummaryRow {
    session: ChatSessionRow,
    message_count: i64,
    last_message: Option<ChatMessageRow>,
}

impl SessionSummaryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        let session = ChatSessionRow::from_row(row)?;
        let last_id: Option<String> = row.try_get("last_id")?;
        let last_message = match last_id {
            Some(id) => Some(ChatMessageRow {
                id,
                session_id: session.id.clone(),
                role: row.try_get("last_role")?,
                content: row.try_get("last_content")?,
                created_at: row.try_get("last_created_at")?,
            }),
            None => None,
        };

        Ok(Self {
            session,
            message_count: row.try_get("message_count")?,
            last_message,
        })
    }

    fn into_summary(self) -> Result<SessionSummary, RepositoryError> {
        let last_message = self
            .last_message
            .map(ChatMessageRow::into_message)
            .transpose()?;
        let message_count = u32::try_from(self.message_count)
            .map_err(|e| RepositoryError::Query(format!("invalid message count: {e}")))?;

        Ok(SessionSummary::new(
            self.session.into_session()?,
            message_count,
            last_message,
        ))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width UTC form so that string comparison in SQL is chronological.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_sessions (id, title, user_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(session.id.to_string())
        .bind(&session.title)
        .bind(session.user_id.map(|u| u.to_string()))
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(session.clone())
    }

    async fn get_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row).map_err(query_error)?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chat_sessions SET title = ?, updated_at = ? WHERE id = ?")
            .bind(&session.title)
            .bind(format_datetime(&session.updated_at))
            .bind(session.id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT s.*,
                      (SELECT COUNT(*) FROM chat_messages c WHERE c.session_id = s.id) AS message_count,
                      m.id AS last_id, m.role AS last_role, m.content AS last_content,
                      m.created_at AS last_created_at
               FROM chat_sessions s
               LEFT JOIN chat_messages m ON m.id = (
                   SELECT l.id FROM chat_messages l WHERE l.session_id = s.id
                   ORDER BY l.created_at DESC, l.id DESC LIMIT 1
               )
               ORDER BY s.updated_at DESC, s.id DESC"#,
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let summary_row = SessionSummaryRow::from_row(row).map_err(query_error)?;
            sessions.push(summary_row.into_summary()?);
        }

        Ok(sessions)
    }

    async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
        // Messages go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn append_message(
        &self,
        message: &ChatMessage,
        touched_at: DateTime<Utc>,
        auto_title: Option<&str>,
    ) -> Result<ChatSession, RepositoryError> {
        let session_id = message.session_id.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        // MAX keeps a concurrent update's later timestamp; the fixed-width
        // format makes text comparison chronological.
        let touched =
            sqlx::query("UPDATE chat_sessions SET updated_at = MAX(updated_at, ?) WHERE id = ?")
                .bind(format_datetime(&touched_at))
                .bind(&session_id)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;

        if touched.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(&session_id)
        .bind(&message.role)
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        if let Some(title) = auto_title {
            sqlx::query(
                r#"UPDATE chat_sessions SET title = ?
                   WHERE id = ? AND title = ?
                     AND (SELECT COUNT(*) FROM chat_messages WHERE session_id = ? AND role = ?) = 1"#,
            )
            .bind(title)
            .bind(&session_id)
            .bind(DEFAULT_SESSION_TITLE)
            .bind(&session_id)
            .bind(roles::USER)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        }

        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(&session_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(query_error)?;
        let session = ChatSessionRow::from_row(&row)
            .map_err(query_error)?
            .into_session()?;

        tx.commit().await.map_err(query_error)?;

        Ok(session)
    }

    async fn get_messages(&self, session_id: &Uuid) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row).map_err(query_error)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }
}
