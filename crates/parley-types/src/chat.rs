//! Chat session and message types for Parley.
//!
//! These types model persisted conversations: sessions, the messages they
//! own, and the request/response representations exposed over the API.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to every session created without an explicit one.
///
/// Auto-titling only ever replaces a title that still has this exact value.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// Maximum number of characters copied from a message into a derived title.
pub const AUTO_TITLE_MAX_CHARS: usize = 50;

/// Maximum length of a caller-supplied title, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Current time at the precision timestamps are persisted with (microseconds).
///
/// Stamping in-memory values at storage precision keeps a freshly created
/// value equal to the same value read back from the database.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Well-known message roles.
///
/// Roles are stored as free strings; these are the values clients are
/// expected to send. Only [`roles::USER`] has special meaning (auto-title).
pub mod roles {
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
    pub const SYSTEM: &str = "system";
}

/// A persisted conversation container.
///
/// `user_id` is the owner reference. No authentication is enforced, so it is
/// always `None` today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub title: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Build a new, unowned session stamped with the current time.
    pub fn new(title: Option<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::now_v7(),
            title: title.unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string()),
            user_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the title is still the untouched default.
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_SESSION_TITLE
    }
}

/// A single role-tagged utterance belonging to exactly one session.
///
/// Messages are immutable once created and ordered by `created_at`
/// within their session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    #[serde(rename = "session")]
    pub session_id: Uuid,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Build a new message for `session_id` stamped with the current time.
    pub fn new(session_id: Uuid, role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            role: role.into(),
            content: content.into(),
            created_at: timestamp_now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == roles::USER
    }
}

/// Abbreviated session representation used by the session index.
///
/// Carries the message count and the latest message so that an index can be
/// rendered without fetching every session's messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<MessageView>,
}

impl SessionSummary {
    pub fn new(session: ChatSession, message_count: u32, last_message: Option<ChatMessage>) -> Self {
        Self {
            id: session.id,
            title: session.title,
            created_at: session.created_at,
            updated_at: session.updated_at,
            message_count,
            last_message: last_message.map(MessageView::from),
        }
    }
}

/// Message as nested inside a [`SessionDetail`] (no session back-reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: Uuid,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for MessageView {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            role: message.role,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

/// Full session representation with its messages in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<MessageView>,
}

impl SessionDetail {
    pub fn new(session: ChatSession, messages: Vec<ChatMessage>) -> Self {
        Self {
            id: session.id,
            title: session.title,
            created_at: session.created_at,
            updated_at: session.updated_at,
            messages: messages.into_iter().map(MessageView::from).collect(),
        }
    }
}

/// Request body for creating a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Request body for updating a session (PUT and PATCH).
///
/// An omitted field leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

/// Request body for appending a message to a session.
///
/// Both fields are optional at the wire level so that a missing field is
/// reported as a bad request rather than a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppendMessageRequest {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}
