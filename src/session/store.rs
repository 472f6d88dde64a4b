//! Conversation store — the send/clear state machine.
//!
//! ARCHITECTURE
//! ============
//! Single source of truth for the session: the ordered message log, the
//! loading flag that serializes chat exchanges, and the staged attachments
//! (owned by the composed [`AttachmentManager`]). Every operation catches
//! its gateway failure at the boundary and converts it to local state;
//! nothing here retries.
//!
//! Ordering guarantees: the user message is appended before the gateway call
//! starts, and the staged snapshot is taken and cleared in that same
//! synchronous step.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{info, warn};

use super::attachments::AttachmentManager;
use super::message::Message;
use crate::gateway::Gateway;
use crate::stream::StreamEvent;

/// Alert text when the backend refuses to clear the conversation.
pub const CLEAR_FAILED_TEXT: &str = "Failed to clear memory. Please try again.";

const CLEAR_PROMPT: &str = "Are you sure you want to clear the conversation history?";

/// Yes/no gate for destructive operations. Injected so the clear flow is
/// testable without a terminal.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Outcome of a clear request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The user declined the confirmation gate.
    Cancelled,
    /// Gateway acknowledged; messages and staged files were reset.
    Cleared,
    /// Gateway failed; state is unchanged. Carries the alert text.
    Failed(String),
}

pub struct ConversationStore {
    gateway: Arc<dyn Gateway>,
    messages: Vec<Message>,
    attachments: AttachmentManager,
    loading: bool,
    next_id: u64,
    use_memory: bool,
}

impl ConversationStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn Gateway>, use_memory: bool) -> Self {
        Self {
            gateway,
            messages: Vec::new(),
            attachments: AttachmentManager::new(),
            loading: false,
            next_id: 0,
            use_memory,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while a chat request is outstanding.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn attachments(&self) -> &AttachmentManager {
        &self.attachments
    }

    /// Upload and stage a file for the next message. Not gated by `loading`.
    pub async fn stage(&mut self, filename: &str, bytes: Vec<u8>) -> bool {
        let gateway = Arc::clone(&self.gateway);
        self.attachments.stage(gateway.as_ref(), filename, bytes).await
    }

    /// Remove a staged file. Not gated by `loading`.
    pub async fn unstage(&mut self, file_id: &str) -> bool {
        let gateway = Arc::clone(&self.gateway);
        self.attachments.unstage(gateway.as_ref(), file_id).await
    }

    pub fn dismiss_error(&mut self) {
        self.attachments.dismiss_error();
    }

    /// Send one user message and wait for the full reply.
    ///
    /// Silently a no-op when the input is blank or a request is already in
    /// flight. Failures append the fixed error reply instead of propagating.
    pub async fn submit(&mut self, text: &str) {
        let Some(query) = self.begin_exchange(text) else {
            return;
        };

        match self.gateway.chat(&query, self.use_memory).await {
            Ok(response) => {
                info!(
                    answer_len = response.answer.len(),
                    sources = response.sources.len(),
                    "chat reply received"
                );
                let id = self.allocate_id();
                self.messages.push(Message::assistant(id, response));
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "chat request failed");
                let id = self.allocate_id();
                self.messages.push(Message::assistant_error(id));
            }
        }
        self.loading = false;
    }

    /// Send one user message and merge the streamed reply incrementally.
    ///
    /// `on_chunk` observes each fragment as it is appended (the presentation
    /// hook). Gating and ordering are identical to [`Self::submit`].
    pub async fn submit_streamed(&mut self, text: &str, mut on_chunk: impl FnMut(&str)) {
        let Some(query) = self.begin_exchange(text) else {
            return;
        };

        let mut events = match self.gateway.chat_stream(&query, self.use_memory).await {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "chat stream failed to open");
                let id = self.allocate_id();
                self.messages.push(Message::assistant_error(id));
                self.loading = false;
                return;
            }
        };

        let reply_id = self.allocate_id();
        self.messages.push(Message::assistant_pending(reply_id));

        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Chunk(fragment) => {
                    on_chunk(&fragment);
                    if let Some(reply) = self.message_mut(reply_id) {
                        reply.content.push_str(&fragment);
                    }
                }
                StreamEvent::Done(response) => {
                    info!(sources = response.sources.len(), "stream complete");
                    if let Some(reply) = self.message_mut(reply_id) {
                        if reply.content.is_empty() {
                            reply.content = response.answer;
                        }
                        reply.performance = response.performance;
                        reply.sources = response.sources;
                        reply.enhanced_query = response.enhanced_query;
                    }
                    break;
                }
                StreamEvent::Error(message) => {
                    warn!(%message, "stream reported an error");
                    if let Some(reply) = self.message_mut(reply_id) {
                        *reply = Message::assistant_error(reply.id);
                    }
                    break;
                }
            }
        }
        self.loading = false;
    }

    /// Clear the conversation, gated on explicit confirmation.
    ///
    /// Local state changes only after the gateway acknowledges; on failure
    /// everything is left as it was.
    pub async fn clear(&mut self, confirm: &dyn Confirm) -> ClearOutcome {
        if !confirm.confirm(CLEAR_PROMPT) {
            return ClearOutcome::Cancelled;
        }

        match self.gateway.clear_memory().await {
            Ok(()) => {
                info!(discarded = self.messages.len(), "conversation cleared");
                self.messages.clear();
                self.attachments = AttachmentManager::new();
                ClearOutcome::Cleared
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "clear failed; state unchanged");
                ClearOutcome::Failed(CLEAR_FAILED_TEXT.to_owned())
            }
        }
    }

    /// Gate the submit and append the user message. Returns the trimmed
    /// query, or None when the submit is a no-op. The staged snapshot is
    /// taken and cleared here, before any await.
    fn begin_exchange(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.loading {
            info!("submit ignored: request already in flight");
            return None;
        }

        let attached = self.attachments.take_staged();
        let id = self.allocate_id();
        self.messages.push(Message::user(id, trimmed, attached));
        self.loading = true;
        Some(trimmed.to_owned())
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn message_mut(&mut self, id: u64) -> Option<&mut Message> {
        self.messages.iter_mut().rfind(|m| m.id == id)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
