//! Prompt domain
//!
//! Templates for the prompts sent at each stage of a deliberation.

mod template;

pub use template::CouncilPrompt;
