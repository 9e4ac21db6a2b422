//! Call timeouts from TOML (`[execution]` section)

use council_application::ExecutionParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    /// Per-call timeout for council, rater and chairman calls
    pub model_timeout_secs: u64,
    /// Timeout for the title call
    pub title_timeout_secs: u64,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            model_timeout_secs: 120,
            title_timeout_secs: 30,
        }
    }
}

impl FileExecutionConfig {
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_model_timeout(Some(Duration::from_secs(self.model_timeout_secs)))
            .with_title_timeout(Duration::from_secs(self.title_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_execution_params() {
        let config = FileExecutionConfig {
            model_timeout_secs: 45,
            title_timeout_secs: 5,
        };
        let params = config.to_execution_params();
        assert_eq!(params.model_timeout, Some(Duration::from_secs(45)));
        assert_eq!(params.title_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_defaults_match_application_defaults() {
        assert_eq!(
            FileExecutionConfig::default().to_execution_params(),
            ExecutionParams::default()
        );
    }
}
