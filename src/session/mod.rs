//! Session state — messages, staged attachments, and the store that
//! composes them.

pub mod attachments;
pub mod message;
pub mod notice;
pub mod store;

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use futures::StreamExt;

    use crate::gateway::types::{
        Attachment, ChatResponse, Exchange, GatewayError, SessionStats, SourceDocument,
    };
    use crate::gateway::{EventStream, Gateway};
    use crate::stream::StreamEvent;

    /// Scripted gateway double. Each operation pops its next scripted result
    /// or falls back to a benign default, and records the call.
    #[derive(Default)]
    pub struct MockGateway {
        pub chat_results: Mutex<Vec<Result<ChatResponse, GatewayError>>>,
        pub stream_results: Mutex<Vec<Result<Vec<StreamEvent>, GatewayError>>>,
        pub upload_results: Mutex<Vec<Result<Attachment, GatewayError>>>,
        pub remove_results: Mutex<Vec<Result<(), GatewayError>>>,
        pub clear_results: Mutex<Vec<Result<(), GatewayError>>>,
        /// Operation log, e.g. `"chat:question"` or `"upload:a.pdf"`.
        pub calls: Mutex<Vec<String>>,
    }

    impl MockGateway {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script_chat(self, result: Result<ChatResponse, GatewayError>) -> Self {
            self.chat_results.lock().unwrap().push(result);
            self
        }

        pub fn script_stream(self, result: Result<Vec<StreamEvent>, GatewayError>) -> Self {
            self.stream_results.lock().unwrap().push(result);
            self
        }

        pub fn script_upload(self, result: Result<Attachment, GatewayError>) -> Self {
            self.upload_results.lock().unwrap().push(result);
            self
        }

        pub fn script_remove(self, result: Result<(), GatewayError>) -> Self {
            self.remove_results.lock().unwrap().push(result);
            self
        }

        pub fn script_clear(self, result: Result<(), GatewayError>) -> Self {
            self.clear_results.lock().unwrap().push(result);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    /// Parse a `ChatResponse` fixture.
    #[must_use]
    pub fn chat_response(json: &str) -> ChatResponse {
        serde_json::from_str(json).expect("valid chat response fixture")
    }

    /// Attachment as the backend would return it after upload.
    #[must_use]
    pub fn attachment(file_id: &str, filename: &str, size: u64) -> Attachment {
        Attachment { file_id: file_id.into(), filename: filename.into(), size, text_length: size / 2 }
    }

    #[async_trait::async_trait]
    impl Gateway for MockGateway {
        async fn chat(&self, query: &str, _use_memory: bool) -> Result<ChatResponse, GatewayError> {
            self.record(format!("chat:{query}"));
            let mut scripted = self.chat_results.lock().unwrap();
            if scripted.is_empty() {
                Ok(chat_response(r#"{"answer":"ok"}"#))
            } else {
                scripted.remove(0)
            }
        }

        async fn chat_stream(
            &self,
            query: &str,
            _use_memory: bool,
        ) -> Result<EventStream, GatewayError> {
            self.record(format!("stream:{query}"));
            let mut scripted = self.stream_results.lock().unwrap();
            let events = if scripted.is_empty() {
                vec![StreamEvent::Done(chat_response(r#"{"answer":"ok"}"#))]
            } else {
                scripted.remove(0)?
            };
            Ok(futures::stream::iter(events).boxed())
        }

        async fn clear_memory(&self) -> Result<(), GatewayError> {
            self.record("clear".to_owned());
            let mut scripted = self.clear_results.lock().unwrap();
            if scripted.is_empty() { Ok(()) } else { scripted.remove(0) }
        }

        async fn upload_file(
            &self,
            filename: &str,
            bytes: Vec<u8>,
        ) -> Result<Attachment, GatewayError> {
            self.record(format!("upload:{filename}"));
            let mut scripted = self.upload_results.lock().unwrap();
            if scripted.is_empty() {
                Ok(attachment("f-default", filename, bytes.len() as u64))
            } else {
                scripted.remove(0)
            }
        }

        async fn remove_file(&self, file_id: &str) -> Result<(), GatewayError> {
            self.record(format!("remove:{file_id}"));
            let mut scripted = self.remove_results.lock().unwrap();
            if scripted.is_empty() { Ok(()) } else { scripted.remove(0) }
        }

        async fn uploaded_files(&self) -> Result<Vec<Attachment>, GatewayError> {
            self.record("uploaded_files".to_owned());
            Ok(Vec::new())
        }

        async fn session_stats(
            &self,
            _hit_rate_method: &str,
            _hit_rate_threshold: f64,
        ) -> Result<SessionStats, GatewayError> {
            self.record("stats".to_owned());
            Ok(SessionStats::default())
        }

        async fn history(&self) -> Result<Vec<Exchange>, GatewayError> {
            self.record("history".to_owned());
            Ok(Vec::new())
        }

        async fn source(&self, source_id: &str) -> Result<SourceDocument, GatewayError> {
            self.record(format!("source:{source_id}"));
            Ok(SourceDocument::default())
        }

        async fn evaluate(
            &self,
            _hit_rate_method: &str,
            _hit_rate_threshold: f64,
        ) -> Result<SessionStats, GatewayError> {
            self.record("evaluate".to_owned());
            Ok(SessionStats::default())
        }

        async fn evaluation_methods(&self) -> Result<Vec<String>, GatewayError> {
            self.record("evaluation_methods".to_owned());
            Ok(Vec::new())
        }
    }
}
