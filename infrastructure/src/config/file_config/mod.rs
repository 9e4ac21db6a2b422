//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod council;
mod execution;
mod gateway;
mod logging;
mod output;

pub use council::FileCouncilConfig;
pub use execution::FileExecutionConfig;
pub use gateway::{DEFAULT_API_KEY_ENV, DEFAULT_API_URL, FileGatewayConfig};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Council membership
    pub council: FileCouncilConfig,
    /// OpenRouter endpoint and credentials
    pub gateway: FileGatewayConfig,
    /// Call timeouts
    pub execution: FileExecutionConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Transcript settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Empty model names in every `[council]` field
    /// 2. Empty or duplicated council and rater lists
    /// 3. Zero timeouts and an empty API URL
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.council.parse_models().1);
        issues.extend(self.council.parse_chairman().1);
        issues.extend(self.council.parse_raters().1);
        issues.extend(self.council.parse_title_model().1);

        let zero_checks = [
            ("gateway.timeout_secs", self.gateway.timeout_secs),
            ("execution.model_timeout_secs", self.execution.model_timeout_secs),
            ("execution.title_timeout_secs", self.execution.title_timeout_secs),
        ];
        for (field, value) in zero_checks {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidValue {
                        field: field.to_string(),
                        value: value.to_string(),
                    },
                    format!("{}: must be greater than 0", field),
                ));
            }
        }

        if self.gateway.api_url.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidValue {
                    field: "gateway.api_url".to_string(),
                    value: self.gateway.api_url.clone(),
                },
                "gateway.api_url: cannot be empty",
            ));
        }

        if self.gateway.api_key_env.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidValue {
                    field: "gateway.api_key_env".to_string(),
                    value: String::new(),
                },
                "gateway.api_key_env: empty, requests will be sent without an API key",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::OutputFormat;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[council]
models = ["openai/gpt-4o", "anthropic/claude-sonnet-4.5"]
chairman = "google/gemini-2.5-pro"
raters = ["openai/gpt-4o"]

[gateway]
api_key_env = "MY_ROUTER_KEY"

[execution]
model_timeout_secs = 60

[output]
format = "full"
color = false

[logging]
conversation_log = "/tmp/council.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.council.models.as_ref().unwrap().len(), 2);
        assert_eq!(
            config.council.chairman,
            Some("google/gemini-2.5-pro".to_string())
        );
        assert_eq!(config.gateway.api_key_env, "MY_ROUTER_KEY");
        assert_eq!(config.execution.model_timeout_secs, 60);
        assert_eq!(config.execution.title_timeout_secs, 30);
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);
        assert!(config.logging.conversation_log.is_some());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.council.models.is_none());
        assert!(config.output.color);
        assert!(config.logging.conversation_log.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let toml_str = r#"
[council]
models = ["a/one", "", "a/one"]
chairman = " "

[execution]
model_timeout_secs = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();

        assert_eq!(issues.len(), 4);
        assert!(issues.iter().all(|i| i.is_error()));
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::InvalidValue { field, .. } if field == "execution.model_timeout_secs"
        )));
    }

    #[test]
    fn test_empty_key_env_is_warning() {
        let mut config = FileConfig::default();
        config.gateway.api_key_env = String::new();
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }
}
