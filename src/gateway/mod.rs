//! Backend gateway — the transport boundary to the QA service.
//!
//! DESIGN
//! ======
//! `types` holds the wire types and error enum, `http` the reqwest-backed
//! implementation. The [`Gateway`] trait is the seam the session layer
//! depends on, so stores and attachment managers are mockable in tests.

pub mod http;
pub mod types;

pub use http::HttpGateway;

use futures::stream::BoxStream;

use crate::stream::StreamEvent;
use types::{Attachment, ChatResponse, Exchange, GatewayError, SessionStats, SourceDocument};

/// Lazy, finite event sequence produced by the streaming chat operation.
///
/// Ends at the first terminal event; not restartable.
pub type EventStream = BoxStream<'static, StreamEvent>;

/// Async interface over every backend operation the client consumes.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    /// Send one question and wait for the full structured answer.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport failure, non-success status,
    /// or an unreadable response body.
    async fn chat(&self, query: &str, use_memory: bool) -> Result<ChatResponse, GatewayError>;

    /// Send one question and receive the answer incrementally.
    ///
    /// # Errors
    ///
    /// Fails only if the stream cannot be opened; failures after that are
    /// reported in-band as [`StreamEvent::Error`].
    async fn chat_stream(&self, query: &str, use_memory: bool) -> Result<EventStream, GatewayError>;

    /// Clear the server-side conversation memory.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backend does not acknowledge.
    async fn clear_memory(&self) -> Result<(), GatewayError>;

    /// Upload a file for context extraction.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`]; server-side rejections carry a `detail`
    /// message retrievable via [`GatewayError::detail`].
    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<Attachment, GatewayError>;

    /// Remove a previously uploaded file.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the backend does not acknowledge.
    async fn remove_file(&self, file_id: &str) -> Result<(), GatewayError>;

    /// List files currently held by the backend.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport or parse failure.
    async fn uploaded_files(&self) -> Result<Vec<Attachment>, GatewayError>;

    /// Aggregate metrics for the current session. Read-only.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport or parse failure.
    async fn session_stats(
        &self,
        hit_rate_method: &str,
        hit_rate_threshold: f64,
    ) -> Result<SessionStats, GatewayError>;

    /// Server-side question/answer history. Read-only.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport or parse failure.
    async fn history(&self) -> Result<Vec<Exchange>, GatewayError>;

    /// Full text of one cited source document. Read-only.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport or parse failure.
    async fn source(&self, source_id: &str) -> Result<SourceDocument, GatewayError>;

    /// Run the backend's retrieval evaluation and return its metrics.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport or parse failure.
    async fn evaluate(
        &self,
        hit_rate_method: &str,
        hit_rate_threshold: f64,
    ) -> Result<SessionStats, GatewayError>;

    /// Names of the hit-rate evaluation methods the backend supports.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] on transport or parse failure.
    async fn evaluation_methods(&self) -> Result<Vec<String>, GatewayError>;
}
