//! HTTP gateway client.
//!
//! Thin reqwest wrapper over the backend's REST surface. One shared client
//! carries the connect timeout; per-operation request timeouts come from
//! config (chat responses can take minutes, uploads include server-side text
//! extraction). Parsing is pure and kept apart from I/O for testability.

use std::time::Duration;

use futures::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{Attachment, ChatResponse, Exchange, GatewayError, SessionStats, SourceDocument};
use super::{EventStream, Gateway};

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    timeouts: crate::config::Timeouts,
}

impl HttpGateway {
    /// Build the gateway from client config.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &crate::config::Config) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeouts: config.timeouts,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
        timeout_secs: u64,
    ) -> Result<String, GatewayError> {
        let mut request = self
            .http
            .post(self.url(path))
            .timeout(Duration::from_secs(timeout_secs));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        read_body(response).await
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<String, GatewayError> {
        let response = self
            .http
            .get(self.url(path))
            .timeout(Duration::from_secs(self.timeouts.chat_secs))
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        read_body(response).await
    }
}

// =============================================================================
// GATEWAY IMPL
// =============================================================================

#[async_trait::async_trait]
impl Gateway for HttpGateway {
    async fn chat(&self, query: &str, use_memory: bool) -> Result<ChatResponse, GatewayError> {
        let body = ChatRequest { query, use_memory };
        let text = self
            .post_json("/api/chat", Some(&body), self.timeouts.chat_secs)
            .await?;
        parse::<ChatResponse>(&text)
    }

    async fn chat_stream(&self, query: &str, use_memory: bool) -> Result<EventStream, GatewayError> {
        let body = ChatRequest { query, use_memory };
        let response = self
            .http
            .post(self.url("/api/chat/stream"))
            .timeout(Duration::from_secs(self.timeouts.chat_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status: status.as_u16(), detail: parse_detail(&text) });
        }

        let bytes = response
            .bytes_stream()
            .map(|r| r.map_err(|e| GatewayError::Request(e.to_string())))
            .boxed();
        Ok(crate::stream::events(bytes).boxed())
    }

    async fn clear_memory(&self) -> Result<(), GatewayError> {
        self.post_json::<()>("/api/clear", None, self.timeouts.chat_secs)
            .await?;
        Ok(())
    }

    async fn upload_file(&self, filename: &str, bytes: Vec<u8>) -> Result<Attachment, GatewayError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/api/upload"))
            .timeout(Duration::from_secs(self.timeouts.upload_secs))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        let text = read_body(response).await?;
        parse::<Attachment>(&text)
    }

    async fn remove_file(&self, file_id: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/upload/{file_id}")))
            .timeout(Duration::from_secs(self.timeouts.upload_secs))
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        read_body(response).await?;
        Ok(())
    }

    async fn uploaded_files(&self) -> Result<Vec<Attachment>, GatewayError> {
        let text = self.get_json("/api/upload", &[]).await?;
        Ok(parse::<UploadListResponse>(&text)?.files)
    }

    async fn session_stats(
        &self,
        hit_rate_method: &str,
        hit_rate_threshold: f64,
    ) -> Result<SessionStats, GatewayError> {
        let text = self
            .get_json("/api/stats", &hit_rate_query(hit_rate_method, hit_rate_threshold))
            .await?;
        parse::<SessionStats>(&text)
    }

    async fn history(&self) -> Result<Vec<Exchange>, GatewayError> {
        let text = self.get_json("/api/history", &[]).await?;
        Ok(parse::<HistoryResponse>(&text)?.history)
    }

    async fn source(&self, source_id: &str) -> Result<SourceDocument, GatewayError> {
        let text = self
            .get_json(&format!("/api/sources/{source_id}"), &[])
            .await?;
        parse::<SourceDocument>(&text)
    }

    async fn evaluate(
        &self,
        hit_rate_method: &str,
        hit_rate_threshold: f64,
    ) -> Result<SessionStats, GatewayError> {
        let response = self
            .http
            .post(self.url("/api/evaluate"))
            .timeout(Duration::from_secs(self.timeouts.chat_secs))
            .query(&hit_rate_query(hit_rate_method, hit_rate_threshold))
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        let text = read_body(response).await?;
        parse::<SessionStats>(&text)
    }

    async fn evaluation_methods(&self) -> Result<Vec<String>, GatewayError> {
        let text = self.get_json("/api/evaluation/methods", &[]).await?;
        Ok(parse::<MethodsResponse>(&text)?.methods)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
    use_memory: bool,
}

#[derive(serde::Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<Exchange>,
}

#[derive(serde::Deserialize)]
struct UploadListResponse {
    #[serde(default)]
    files: Vec<Attachment>,
}

#[derive(serde::Deserialize)]
struct MethodsResponse {
    #[serde(default)]
    methods: Vec<String>,
}

fn hit_rate_query(method: &str, threshold: f64) -> [(&'static str, String); 2] {
    [
        ("hit_rate_method", method.to_owned()),
        ("hit_rate_threshold", threshold.to_string()),
    ]
}

// =============================================================================
// PARSING
// =============================================================================

async fn read_body(response: reqwest::Response) -> Result<String, GatewayError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| GatewayError::Request(e.to_string()))?;

    if !status.is_success() {
        return Err(GatewayError::Status { status: status.as_u16(), detail: parse_detail(&text) });
    }
    Ok(text)
}

fn parse<T: DeserializeOwned>(json: &str) -> Result<T, GatewayError> {
    serde_json::from_str(json).map_err(|e| GatewayError::Parse(e.to_string()))
}

/// Extract the `detail` message the backend attaches to failure bodies.
fn parse_detail(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("detail")?
        .as_str()
        .map(ToOwned::to_owned)
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
