//! LLM gateway adapters

mod openrouter;

pub use openrouter::OpenRouterGateway;
