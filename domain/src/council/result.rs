//! The result bundle of one deliberation.

use crate::core::model::Model;
use crate::core::question::Question;
use crate::council::aggregate::AggregateEntry;
use crate::council::label::Label;
use crate::council::parsing::ParseStrategy;
use crate::council::response::{ModelError, ModelResponse};
use crate::council::state::DeliberationState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One rater's ranking, raw and parsed.
///
/// `parsed_order` may be shorter than the label set and keeps the order the
/// rater wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSubmission {
    pub rater: Model,
    pub raw_text: String,
    pub parsed_order: Vec<Label>,
    pub parse_strategy: ParseStrategy,
}

impl RankingSubmission {
    /// Parsed order with every label replaced by its model.
    ///
    /// Labels missing from `label_to_model` are dropped.
    pub fn deanonymized<'a>(&self, label_to_model: &'a BTreeMap<Label, Model>) -> Vec<&'a Model> {
        self.parsed_order
            .iter()
            .filter_map(|label| label_to_model.get(label))
            .collect()
    }
}

/// A rater whose Stage-2 call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaterFailure {
    pub rater: Model,
    pub error: ModelError,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Stage2Result {
    pub rankings: Vec<RankingSubmission>,
    pub failures: Vec<RaterFailure>,
    pub label_to_model: BTreeMap<Label, Model>,
    pub aggregate: Vec<AggregateEntry>,
}

impl Stage2Result {
    /// True when no rater produced a usable submission.
    pub fn is_empty(&self) -> bool {
        self.rankings.is_empty()
    }
}

/// Outcome of the chairman call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Synthesis {
    Completed { model: Model, text: String },
    Failed { model: Model, error: ModelError },
}

impl Synthesis {
    pub fn model(&self) -> &Model {
        match self {
            Synthesis::Completed { model, .. } | Synthesis::Failed { model, .. } => model,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Synthesis::Completed { text, .. } => Some(text),
            Synthesis::Failed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Synthesis::Completed { .. })
    }
}

/// Everything one deliberation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationResult {
    pub question: Question,
    pub state: DeliberationState,
    pub stage1: Vec<ModelResponse>,
    pub stage2: Stage2Result,
    pub stage3: Synthesis,
}

impl DeliberationResult {
    pub fn successful_responses(&self) -> impl Iterator<Item = &ModelResponse> {
        self.stage1.iter().filter(|r| r.is_success())
    }

    pub fn failed_responses(&self) -> impl Iterator<Item = &ModelResponse> {
        self.stage1.iter().filter(|r| !r.is_success())
    }

    pub fn is_complete(&self) -> bool {
        self.state == DeliberationState::Complete
    }
}
