//! Conversation message records.

use std::time::SystemTime;

use crate::gateway::types::{Attachment, ChatResponse, Performance, Source};

/// Fixed user-facing text for failed exchanges. The underlying error is
/// logged, never shown.
pub const CHAT_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// A single conversation entry.
///
/// Append-only once created; `content` grows in place only while an
/// assistant reply is streaming.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique within the session, monotonically increasing.
    pub id: u64,
    pub role: Role,
    /// Markdown source as received; rendering is the caller's concern.
    pub content: String,
    pub timestamp: SystemTime,
    /// Locally synthesized failure notice. Never sent to the server.
    pub is_error: bool,
    pub performance: Option<Performance>,
    pub sources: Vec<Source>,
    pub enhanced_query: Option<String>,
    /// Frozen snapshot of the files staged when this user message was sent.
    pub attached_files: Vec<Attachment>,
}

impl Message {
    #[must_use]
    pub fn user(id: u64, content: impl Into<String>, attached_files: Vec<Attachment>) -> Self {
        Self { content: content.into(), attached_files, ..Self::base(id, Role::User) }
    }

    /// Assistant reply built from a complete chat response.
    #[must_use]
    pub fn assistant(id: u64, response: ChatResponse) -> Self {
        Self {
            content: response.answer,
            performance: response.performance,
            sources: response.sources,
            enhanced_query: response.enhanced_query,
            ..Self::base(id, Role::Assistant)
        }
    }

    /// Empty in-progress assistant reply, filled by streaming ingestion.
    #[must_use]
    pub fn assistant_pending(id: u64) -> Self {
        Self::base(id, Role::Assistant)
    }

    /// Locally synthesized failure notice.
    #[must_use]
    pub fn assistant_error(id: u64) -> Self {
        Self { content: CHAT_ERROR_TEXT.to_owned(), is_error: true, ..Self::base(id, Role::Assistant) }
    }

    fn base(id: u64, role: Role) -> Self {
        Self {
            id,
            role,
            content: String::new(),
            timestamp: SystemTime::now(),
            is_error: false,
            performance: None,
            sources: Vec::new(),
            enhanced_query: None,
            attached_files: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
