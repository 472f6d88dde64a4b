//! Gateway wire types and errors.
//!
//! Shared by the HTTP client and the session layer. Response shapes are
//! permissive: optional metadata deserializes to defaults so older backend
//! builds remain readable.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    /// The request never completed (timeout, reset, DNS failure).
    #[error("request failed: {0}")]
    Request(String),

    /// The backend returned a non-success HTTP status.
    #[error("gateway returned status {status}")]
    Status { status: u16, detail: Option<String> },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Grepable code for structured log fields.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ClientBuild(_) => "E_CLIENT_BUILD",
            Self::Request(_) => "E_REQUEST",
            Self::Status { .. } => "E_STATUS",
            Self::Parse(_) => "E_PARSE",
        }
    }

    /// Server-provided detail text, when the failure carried one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// CHAT
// =============================================================================

/// Final structured chat result. Returned whole by the blocking chat
/// operation and carried by the terminal `done` frame of the streaming one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub performance: Option<Performance>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub enhanced_query: Option<String>,
}

/// Timing metadata attached to successful replies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Performance {
    /// End-to-end answer time in seconds.
    pub total_time: f64,
}

/// One retrieval citation backing an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, alias = "source_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub similarity: Option<f64>,
}

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// A file the backend has accepted and indexed for context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Server-assigned identifier, used for removal.
    pub file_id: String,
    pub filename: String,
    /// Raw file size in bytes.
    pub size: u64,
    /// Length of the text the server extracted. Informational.
    #[serde(default)]
    pub text_length: u64,
}

// =============================================================================
// AUXILIARY VIEWS
// =============================================================================

/// Aggregate session metrics, read-only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionStats {
    #[serde(default)]
    pub total_queries: u64,
    #[serde(default)]
    pub hit_rate: f64,
    #[serde(default)]
    pub avg_response_time: f64,
    #[serde(default)]
    pub avg_similarity: f64,
    #[serde(default)]
    pub metrics: Vec<QueryMetric>,
}

/// Per-query record inside [`SessionStats`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryMetric {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub response_time: f64,
    #[serde(default)]
    pub num_docs: u64,
    #[serde(default)]
    pub hit: bool,
}

/// One question/answer pair from the server-side history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Exchange {
    #[serde(default)]
    pub user_query: String,
    #[serde(default)]
    pub bot_response: String,
}

/// Full text of a cited source document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceDocument {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub source_file: Option<String>,
    /// Number of retrieval chunks combined into `content`.
    #[serde(default)]
    pub total_chunks: Option<u64>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
