//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod generate_title;
pub mod query_executor;
pub mod run_council;
