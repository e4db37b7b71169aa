//! Session and message data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of characters a derived title may have before it is truncated
const TITLE_MAX_CHARS: usize = 30;

/// Number of leading tokens of the first question used for the title
const TITLE_MAX_TOKENS: usize = 6;

/// A conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session id, immutable once created
    pub id: String,
    /// Display title; starts as a placeholder, replaced at most once
    pub title: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Ordered conversation history, append-only
    pub history: Vec<Message>,
}

impl Session {
    /// Create a new session with a fresh id and a placeholder title
    pub fn new() -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let title = placeholder_title(&id);
        Self {
            id,
            title,
            created_at: Utc::now(),
            history: Vec::new(),
        }
    }

    /// Whether the title is still the auto-generated placeholder
    pub fn has_placeholder_title(&self) -> bool {
        self.title.starts_with("Session ")
    }

    /// Listing projection of this session
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            message_count: self.history.len(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// A single message in a session's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message
    pub role: Role,
    /// Message content
    pub text: String,
    /// Append time
    pub timestamp: DateTime<Utc>,
    /// Optional structured payload (assistant replies)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableData>,
    /// Reader feedback; absent means no feedback given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

impl Message {
    /// Create a user message stamped with the current time
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
            table: None,
            feedback: None,
        }
    }

    /// Create an assistant message with an optional table payload
    pub fn assistant(text: impl Into<String>, table: Option<TableData>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
            table,
            feedback: None,
        }
    }
}

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Reader feedback on a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Like,
    Dislike,
}

/// Tabular payload attached to an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    /// Column headers, in display order
    pub columns: Vec<String>,
    /// Rows; each row is expected to have one cell per column
    pub rows: Vec<Vec<String>>,
}

/// Summary of a session as returned by listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
}

/// Placeholder title assigned at session creation
pub fn placeholder_title(id: &str) -> String {
    let prefix: String = id.chars().take(8).collect();
    format!("Session {}", prefix)
}

/// Derive a display title from the first user question.
///
/// Takes the first six whitespace-separated tokens, keeps only ASCII
/// alphanumerics and spaces, and truncates the result to 30 characters
/// with an ellipsis. Returns `None` when nothing usable remains.
pub fn derive_title(candidate: &str) -> Option<String> {
    let joined = candidate
        .split_whitespace()
        .take(TITLE_MAX_TOKENS)
        .collect::<Vec<_>>()
        .join(" ");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return None;
    }

    if cleaned.chars().count() > TITLE_MAX_CHARS {
        let head: String = cleaned.chars().take(TITLE_MAX_CHARS).collect();
        Some(format!("{}...", head))
    } else {
        Some(cleaned.to_string())
    }
}
