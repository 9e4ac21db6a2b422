//! OpenRouter chat-completions gateway
//!
//! One HTTP POST per call against an OpenAI-compatible endpoint. Plain calls
//! read `choices[0].message.content`; streaming calls request server-sent
//! events and forward each `choices[0].delta.content` chunk.

use crate::config::FileGatewayConfig;
use async_trait::async_trait;
use council_application::ports::llm_gateway::{
    GatewayError, LlmGateway, StreamEvent, StreamHandle,
};
use council_domain::Model;
use council_domain::core::string::truncate_chars;
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Longest upstream error text kept in a [`GatewayError`].
const MAX_ERROR_CHARS: usize = 300;

const STREAM_CHANNEL_CAPACITY: usize = 64;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a Model, prompt: &'a str, stream: bool) -> Self {
        Self {
            model: model.as_str(),
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream,
        }
    }
}

/// Gateway to OpenRouter (or any OpenAI-compatible chat-completions URL).
pub struct OpenRouterGateway {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl OpenRouterGateway {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::RequestFailed(format!("HTTP client setup: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
        })
    }

    /// Build from the `[gateway]` section, reading the key from its env var.
    pub fn from_config(config: &FileGatewayConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!(
                "{} is not set; requests will be sent without an API key",
                config.api_key_env
            );
        }
        Self::new(config.api_url.clone(), api_key, config.timeout())
    }

    /// Post the request and return the response once its status is 2xx.
    async fn post(
        &self,
        model: &Model,
        prompt: &str,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        debug!(
            model = %model,
            prompt_chars = prompt.chars().count(),
            stream,
            "Posting chat completion"
        );

        let mut request = self
            .client
            .post(&self.api_url)
            .json(&ChatRequest::new(model, prompt, stream));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::HttpStatus {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmGateway for OpenRouterGateway {
    async fn send(&self, model: &Model, prompt: &str) -> Result<String, GatewayError> {
        let response = self.post(model, prompt, false).await?;
        let body: Value = response.json().await.map_err(map_reqwest_error)?;
        extract_content(&body)
    }

    async fn send_streaming(
        &self,
        model: &Model,
        prompt: &str,
    ) -> Result<StreamHandle, GatewayError> {
        let response = self.post(model, prompt, true).await?;
        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut decoder = SseDecoder::default();
            let mut full_text = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx
                            .send(StreamEvent::Error(map_reqwest_error(e).to_string()))
                            .await;
                        return;
                    }
                };

                for line in decoder.push(&chunk) {
                    match parse_sse_line(&line) {
                        SseFrame::Text(text) => {
                            full_text.push_str(&text);
                            // Receiver gone: the caller stopped listening.
                            if tx.send(StreamEvent::Delta(text)).await.is_err() {
                                return;
                            }
                        }
                        SseFrame::Done => {
                            let _ = tx
                                .send(StreamEvent::Completed(std::mem::take(&mut full_text)))
                                .await;
                            return;
                        }
                        SseFrame::Error(message) => {
                            let _ = tx.send(StreamEvent::Error(message)).await;
                            return;
                        }
                        SseFrame::Ignore => {}
                    }
                }
            }

            // Connection closed without [DONE]
            let _ = tx.send(StreamEvent::Completed(full_text)).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(e.to_string())
    } else if e.is_connect() || e.is_request() {
        GatewayError::ConnectionError(e.to_string())
    } else if e.is_decode() || e.is_body() {
        GatewayError::InvalidResponse(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

/// Pull `choices[0].message.content` out of a completion body.
fn extract_content(body: &Value) -> Result<String, GatewayError> {
    if let Some(message) = body.get("error").map(describe_error) {
        return Err(GatewayError::RequestFailed(message));
    }

    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            GatewayError::InvalidResponse("missing choices[0].message.content".to_string())
        })
}

/// Error text from an error body, preferring `error.message`.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let message = match serde_json::from_str::<Value>(trimmed) {
        Ok(json) => json
            .get("error")
            .map(describe_error)
            .unwrap_or_else(|| trimmed.to_string()),
        Err(_) => trimmed.to_string(),
    };
    Some(truncate_chars(&message, MAX_ERROR_CHARS))
}

fn describe_error(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| error.as_str().map(str::to_string))
        .unwrap_or_else(|| error.to_string())
}

/// Splits a byte stream into complete lines. UTF-8 is decoded per line, so a
/// multi-byte character split across chunks is reassembled first.
#[derive(Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            lines.push(line.trim_end_matches(['\r', '\n']).to_string());
        }
        lines
    }
}

#[derive(Debug, PartialEq)]
enum SseFrame {
    Text(String),
    Done,
    Error(String),
    Ignore,
}

fn parse_sse_line(line: &str) -> SseFrame {
    // Blank separators and ": OPENROUTER PROCESSING" style comments
    let Some(data) = line.strip_prefix("data:") else {
        return SseFrame::Ignore;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseFrame::Done;
    }

    let Ok(json) = serde_json::from_str::<Value>(data) else {
        debug!("Skipping undecodable stream line: {}", data);
        return SseFrame::Ignore;
    };
    if let Some(error) = json.get("error") {
        return SseFrame::Error(describe_error(error));
    }

    match json
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
    {
        Some(text) if !text.is_empty() => SseFrame::Text(text.to_string()),
        _ => SseFrame::Ignore,
    }
}
