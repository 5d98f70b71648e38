//! HTTP transport to LLM providers
//!
//! One request per call, no connection reuse and no retries. A streamed
//! response is forwarded chunk by chunk to the caller and also accumulated,
//! so the envelope always carries the full body.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use super::provider::{ANTHROPIC_VERSION, AuthScheme, ProviderProfile, WireDialect};

/// Default TCP/TLS connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Receives each byte range of a streamed body as it arrives
pub type ChunkSink<'a> = &'a mut (dyn FnMut(&[u8]) + Send);

/// Failures at the network boundary. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Stream interrupted: {0}")]
    Interrupted(String),
}

/// A completed exchange with a 2xx status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Network boundary used by the agent loop
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to the provider. With `on_chunk` the response is streamed
    /// through it; without, the body is buffered. Error bodies are never
    /// streamed.
    async fn send(
        &self,
        profile: &ProviderProfile,
        body: &Value,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<ResponseEnvelope, TransportError>;
}

/// Request headers for `profile`
pub fn build_headers(profile: &ProviderProfile) -> Vec<(&'static str, String)> {
    let mut headers = vec![("content-type", "application/json".to_string())];

    match &profile.auth_scheme {
        AuthScheme::ApiKeyHeader(key) => headers.push(("x-api-key", key.clone())),
        AuthScheme::Bearer(key) => headers.push(("authorization", format!("Bearer {}", key))),
    }

    if profile.wire_dialect == WireDialect::Anthropic {
        headers.push(("anthropic-version", ANTHROPIC_VERSION.to_string()));
    }

    headers
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    connect_timeout: Duration,
}

impl HttpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    fn client(&self) -> Result<Client, TransportError> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(0)
            .http1_only()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        profile: &ProviderProfile,
        body: &Value,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<ResponseEnvelope, TransportError> {
        let client = self.client()?;
        let url = profile.url();
        debug!("POST {} (model={}, stream={})", url, profile.model_identifier, on_chunk.is_some());

        let mut request = client.post(&url).json(body);
        for (name, value) in build_headers(profile) {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| TransportError::Connect(e.to_string()))?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Provider returned HTTP {}", status);
            return Err(TransportError::Status { status, body });
        }

        let body = match on_chunk {
            None => response
                .bytes()
                .await
                .map_err(|e| TransportError::Interrupted(e.to_string()))?
                .to_vec(),
            Some(sink) => {
                let mut accumulated = Vec::new();
                let mut stream = response.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| TransportError::Interrupted(e.to_string()))?;
                    sink(chunk.as_ref());
                    accumulated.extend_from_slice(&chunk);
                }
                accumulated
            }
        };

        debug!("Received {} bytes from {}", body.len(), profile.endpoint_host);
        Ok(ResponseEnvelope { status, body })
    }
}

/// One canned exchange for [`ScriptedTransport`]
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// 2xx body delivered as the given chunks when streaming, or joined when buffered
    Chunks(Vec<Vec<u8>>),
    /// Non-2xx status with an error body
    Status { status: u16, body: String },
    /// Connection-level failure
    Connect(String),
    /// Stream that drops after delivering the given chunks
    DropAfter(Vec<Vec<u8>>),
}

impl ScriptedReply {
    /// Whole body as a single chunk
    pub fn body(body: impl Into<Vec<u8>>) -> Self {
        Self::Chunks(vec![body.into()])
    }

    /// Body split into chunks of `size` bytes
    pub fn chunked(body: impl AsRef<[u8]>, size: usize) -> Self {
        Self::Chunks(body.as_ref().chunks(size.max(1)).map(<[u8]>::to_vec).collect())
    }
}

/// In-memory transport replaying a fixed script of replies. Every request
/// body is recorded for later inspection.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<Value>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Request bodies sent so far, in order
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        _profile: &ProviderProfile,
        body: &Value,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> Result<ResponseEnvelope, TransportError> {
        self.requests.lock().unwrap_or_else(|p| p.into_inner()).push(body.clone());
        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
            .ok_or_else(|| TransportError::Connect("no scripted reply left".to_string()))?;

        let (chunks, interrupted) = match reply {
            ScriptedReply::Status { status, body } => return Err(TransportError::Status { status, body }),
            ScriptedReply::Connect(message) => return Err(TransportError::Connect(message)),
            ScriptedReply::Chunks(chunks) => (chunks, false),
            ScriptedReply::DropAfter(chunks) => (chunks, true),
        };

        let mut accumulated = Vec::new();
        match on_chunk {
            Some(sink) => {
                for chunk in &chunks {
                    sink(chunk.as_slice());
                    accumulated.extend_from_slice(chunk);
                }
            }
            None => chunks.iter().for_each(|c| accumulated.extend_from_slice(c)),
        }

        if interrupted {
            return Err(TransportError::Interrupted("connection reset by peer".to_string()));
        }
        Ok(ResponseEnvelope {
            status: 200,
            body: accumulated,
        })
    }
}
