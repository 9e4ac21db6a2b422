//! Execution parameters for gateway calls.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call time budgets.
///
/// `model_timeout` bounds every Stage-1, Stage-2 and Stage-3 call; `None`
/// leaves calls unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Timeout for each council, rater and chairman call.
    pub model_timeout: Option<Duration>,
    /// Timeout for the title call.
    pub title_timeout: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            model_timeout: Some(Duration::from_secs(120)),
            title_timeout: Duration::from_secs(30),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_model_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.model_timeout = timeout;
        self
    }

    pub fn with_title_timeout(mut self, timeout: Duration) -> Self {
        self.title_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.model_timeout, Some(Duration::from_secs(120)));
        assert_eq!(params.title_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default()
            .with_model_timeout(None)
            .with_title_timeout(Duration::from_secs(5));

        assert!(params.model_timeout.is_none());
        assert_eq!(params.title_timeout, Duration::from_secs(5));
    }
}
