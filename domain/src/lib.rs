//! Domain layer for llm-council
//!
//! This crate contains the deliberation logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is an ordered list of models that answer the same question
//! independently. The order matters: it decides which anonymous label each
//! answer receives and breaks ties in the aggregate ranking.
//!
//! ## Deliberation
//!
//! One question runs through three stages:
//!
//! ```text
//! Stage 1 (Responses)   every member answers            -> Vec<ModelResponse>
//!        │ successful answers only
//!        ▼
//! AnonymizedSet         A, B, C ... in council order
//!        │
//! Stage 2 (Rankings)    raters rank "Response X" tokens  -> Vec<RankingSubmission>
//!        │ parse_ranking + aggregate_rankings
//!        ▼
//! Stage 3 (Synthesis)   chairman sees everything, de-anonymized
//! ```

pub mod config;
pub mod core;
pub mod council;
pub mod prompt;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{error::DomainError, model::Model, question::Question};
pub use council::{
    aggregate::{AggregateEntry, MeanRank, aggregate_rankings},
    label::{AnonymizedSet, Label},
    parsing::{ParseStrategy, ParsedRanking, parse_ranking},
    response::{ErrorKind, ModelError, ModelResponse},
    result::{DeliberationResult, RankingSubmission, RaterFailure, Stage2Result, Synthesis},
    state::{DeliberationState, Stage},
};
pub use prompt::CouncilPrompt;
