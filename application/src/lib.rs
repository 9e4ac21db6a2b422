//! Application layer for llm-council
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CouncilConfig, ExecutionParams};
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway, StreamEvent, StreamHandle},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::generate_title::{FALLBACK_TITLE, GenerateTitleUseCase};
pub use use_cases::query_executor::QueryExecutor;
pub use use_cases::run_council::{RunCouncilError, RunCouncilUseCase};
