//! LLM Gateway port
//!
//! Defines the interface for sending one prompt to one backend model.

use async_trait::async_trait;
use council_domain::{ErrorKind, Model, ModelError};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl GatewayError {
    /// Classify this error for the per-model failure record.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Timeout(_) => ErrorKind::Timeout,
            GatewayError::ConnectionError(_) => ErrorKind::Transport,
            GatewayError::HttpStatus { .. }
            | GatewayError::InvalidResponse(_)
            | GatewayError::RequestFailed(_) => ErrorKind::Upstream,
        }
    }

    pub fn to_model_error(&self) -> ModelError {
        ModelError::new(self.kind(), self.to_string())
    }
}

/// An event in a streaming model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete reply text (signals stream end).
    Completed(String),
    /// An error that occurred mid-stream.
    Error(String),
}

/// Handle for receiving streaming events from a gateway call.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed: return what we have
        Ok(full_text)
    }
}

/// Gateway for LLM communication
///
/// One call, one model, one prompt. Implementations do not retry.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a prompt and wait for the full reply text
    async fn send(&self, model: &Model, prompt: &str) -> Result<String, GatewayError>;

    /// Send a prompt and get a streaming reply.
    ///
    /// Default implementation calls `send()` and wraps the result in a single
    /// `Completed` event.
    async fn send_streaming(
        &self,
        model: &Model,
        prompt: &str,
    ) -> Result<StreamHandle, GatewayError> {
        let result = self.send(model, prompt).await?;
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoGateway;

    #[async_trait]
    impl LlmGateway for EchoGateway {
        async fn send(&self, model: &Model, prompt: &str) -> Result<String, GatewayError> {
            Ok(format!("{model}: {prompt}"))
        }
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(GatewayError::Timeout("slow".into()).kind(), ErrorKind::Timeout);
        assert_eq!(
            GatewayError::ConnectionError("refused".into()).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            GatewayError::HttpStatus {
                status: 502,
                message: "bad gateway".into()
            }
            .kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            GatewayError::InvalidResponse("no choices".into()).kind(),
            ErrorKind::Upstream
        );
    }

    #[test]
    fn test_to_model_error_keeps_message() {
        let err = GatewayError::HttpStatus {
            status: 429,
            message: "rate limited".into(),
        }
        .to_model_error();
        assert_eq!(err.kind, ErrorKind::Upstream);
        assert_eq!(err.message, "HTTP 429: rate limited");
    }

    #[tokio::test]
    async fn test_default_streaming_yields_single_completed_event() {
        let model = Model::new("x/echo").unwrap();
        let mut handle = EchoGateway.send_streaming(&model, "hi").await.unwrap();
        assert_eq!(
            handle.receiver.recv().await,
            Some(StreamEvent::Completed("x/echo: hi".to_string()))
        );
        assert_eq!(handle.receiver.recv().await, None);
    }

    #[tokio::test]
    async fn test_collect_text_prefers_deltas() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Delta("a".into())).await.unwrap();
        tx.send(StreamEvent::Delta("b".into())).await.unwrap();
        tx.send(StreamEvent::Completed("ignored".into())).await.unwrap();
        drop(tx);
        assert_eq!(StreamHandle::new(rx).collect_text().await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn test_collect_text_surfaces_stream_error() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(StreamEvent::Error("cut off".into())).await.unwrap();
        drop(tx);
        assert!(StreamHandle::new(rx).collect_text().await.is_err());
    }
}
