//! Stage-1 answers and per-model failures.

use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Why a single gateway call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The call did not finish within its time budget.
    Timeout,
    /// Connection or HTTP-level failure before a usable reply arrived.
    Transport,
    /// The backend answered with an error status or a malformed payload.
    Upstream,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transport => "transport",
            ErrorKind::Upstream => "upstream",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recorded per-model failure. Captured as data, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ModelError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Outcome of one gateway call for one model.
///
/// Exactly one of `text` and `error` is set; the constructors are the only
/// way to build one, and deserialization re-checks the rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawModelResponse")]
pub struct ModelResponse {
    model: Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ModelError>,
}

impl ModelResponse {
    /// Creates a successful response from a model.
    pub fn success(model: Model, text: impl Into<String>) -> Self {
        Self {
            model,
            text: Some(text.into()),
            error: None,
        }
    }

    /// Creates a failed response indicating the model could not answer.
    pub fn failure(model: Model, error: ModelError) -> Self {
        Self {
            model,
            text: None,
            error: Some(error),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The answer text, if the call succeeded.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The recorded failure, if the call failed.
    pub fn error(&self) -> Option<&ModelError> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.text.is_some()
    }
}

#[derive(Deserialize)]
struct RawModelResponse {
    model: Model,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<ModelError>,
}

impl TryFrom<RawModelResponse> for ModelResponse {
    type Error = String;

    fn try_from(raw: RawModelResponse) -> Result<Self, Self::Error> {
        match (raw.text, raw.error) {
            (Some(text), None) => Ok(ModelResponse::success(raw.model, text)),
            (None, Some(error)) => Ok(ModelResponse::failure(raw.model, error)),
            _ => Err(format!(
                "response for {} must carry exactly one of text or error",
                raw.model
            )),
        }
    }
}
