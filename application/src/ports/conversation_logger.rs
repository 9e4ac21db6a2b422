//! Port for the deliberation transcript.
//!
//! [`ConversationLogger`] records what each stage produced (answers,
//! rankings, the aggregate, the synthesis) in a machine-readable form.
//! `tracing` carries the human-readable diagnostics; this carries the data.

use serde_json::Value;

/// Event types written by the council use case.
pub mod event_type {
    pub const STAGE1_RESPONSE: &str = "stage1_response";
    pub const RANKING_SUBMISSION: &str = "ranking_submission";
    pub const AGGREGATE_RANKING: &str = "aggregate_ranking";
    pub const SYNTHESIS: &str = "synthesis";
}

/// A structured transcript event.
///
/// The timestamp is added by the adapter when the event is written.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier, one of [`event_type`].
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging transcript events.
///
/// `log` is synchronous and infallible; write failures are the adapter's
/// business and never reach the deliberation.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
