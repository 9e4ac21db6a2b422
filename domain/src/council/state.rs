//! Deliberation stages and the state machine that sequences them.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Stage of a deliberation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Every council member answers the question
    Responses,
    /// Raters rank the anonymized answers
    Rankings,
    /// The chairman writes the final answer
    Synthesis,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Responses => "responses",
            Stage::Rankings => "rankings",
            Stage::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Stage::Responses => "Stage 1: Responses",
            Stage::Rankings => "Stage 2: Peer Rankings",
            Stage::Synthesis => "Stage 3: Synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Where a deliberation is in its lifecycle.
///
/// ```text
/// Stage1Pending -> Stage1Done -> Stage2Pending -> Stage2Done -> Stage3Pending -> Complete
///       └──────────────┴──────────────┴──────────────┴──────────────┴──> Failed
/// ```
///
/// `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliberationState {
    #[default]
    Stage1Pending,
    Stage1Done,
    Stage2Pending,
    Stage2Done,
    Stage3Pending,
    Complete,
    Failed,
}

impl DeliberationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliberationState::Stage1Pending => "stage1_pending",
            DeliberationState::Stage1Done => "stage1_done",
            DeliberationState::Stage2Pending => "stage2_pending",
            DeliberationState::Stage2Done => "stage2_done",
            DeliberationState::Stage3Pending => "stage3_pending",
            DeliberationState::Complete => "complete",
            DeliberationState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeliberationState::Complete | DeliberationState::Failed
        )
    }

    /// The stage currently running or just finished, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DeliberationState::Stage1Pending | DeliberationState::Stage1Done => {
                Some(Stage::Responses)
            }
            DeliberationState::Stage2Pending | DeliberationState::Stage2Done => {
                Some(Stage::Rankings)
            }
            DeliberationState::Stage3Pending => Some(Stage::Synthesis),
            DeliberationState::Complete | DeliberationState::Failed => None,
        }
    }

    /// The only successor on the happy path, `None` from a terminal state.
    fn successor(&self) -> Option<DeliberationState> {
        match self {
            DeliberationState::Stage1Pending => Some(DeliberationState::Stage1Done),
            DeliberationState::Stage1Done => Some(DeliberationState::Stage2Pending),
            DeliberationState::Stage2Pending => Some(DeliberationState::Stage2Done),
            DeliberationState::Stage2Done => Some(DeliberationState::Stage3Pending),
            DeliberationState::Stage3Pending => Some(DeliberationState::Complete),
            DeliberationState::Complete | DeliberationState::Failed => None,
        }
    }

    pub fn can_transition_to(&self, next: DeliberationState) -> bool {
        match next {
            DeliberationState::Failed => !self.is_terminal(),
            other => self.successor() == Some(other),
        }
    }

    /// Move to `next`, rejecting anything but the next stage or `Failed`.
    pub fn transition_to(self, next: DeliberationState) -> Result<Self, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::IllegalTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }

    /// Move to the next state on the happy path.
    pub fn advance(self) -> Result<Self, DomainError> {
        match self.successor() {
            Some(next) => Ok(next),
            None => Err(DomainError::IllegalTransition {
                from: self.as_str().to_string(),
                to: "next".to_string(),
            }),
        }
    }

    pub fn fail(self) -> Result<Self, DomainError> {
        self.transition_to(DeliberationState::Failed)
    }
}

impl std::fmt::Display for DeliberationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = DeliberationState::default();
        let expected = [
            DeliberationState::Stage1Done,
            DeliberationState::Stage2Pending,
            DeliberationState::Stage2Done,
            DeliberationState::Stage3Pending,
            DeliberationState::Complete,
        ];
        for next in expected {
            state = state.advance().unwrap();
            assert_eq!(state, next);
        }
        assert!(state.is_terminal());
        assert!(state.advance().is_err());
    }

    #[test]
    fn test_skipping_a_stage_is_rejected() {
        let err = DeliberationState::Stage1Done
            .transition_to(DeliberationState::Stage3Pending)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::IllegalTransition {
                from: "stage1_done".to_string(),
                to: "stage3_pending".to_string(),
            }
        );
        assert!(
            DeliberationState::Stage2Done
                .transition_to(DeliberationState::Stage1Pending)
                .is_err()
        );
    }

    #[test]
    fn test_any_live_state_can_fail() {
        for state in [
            DeliberationState::Stage1Pending,
            DeliberationState::Stage1Done,
            DeliberationState::Stage2Pending,
            DeliberationState::Stage2Done,
            DeliberationState::Stage3Pending,
        ] {
            assert_eq!(state.fail().unwrap(), DeliberationState::Failed);
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        assert!(DeliberationState::Complete.fail().is_err());
        assert!(DeliberationState::Failed.fail().is_err());
        assert!(
            DeliberationState::Failed
                .transition_to(DeliberationState::Complete)
                .is_err()
        );
    }

    #[test]
    fn test_stage_of_state() {
        assert_eq!(
            DeliberationState::Stage2Pending.stage(),
            Some(Stage::Rankings)
        );
        assert_eq!(DeliberationState::Complete.stage(), None);
        assert_eq!(Stage::Synthesis.to_string(), "Stage 3: Synthesis");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&DeliberationState::Stage2Done).unwrap(),
            "\"stage2_done\""
        );
        assert_eq!(
            serde_json::to_string(&Stage::Responses).unwrap(),
            "\"responses\""
        );
    }
}
