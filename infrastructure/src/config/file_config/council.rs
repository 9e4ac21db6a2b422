//! Council membership from TOML (`[council]` section)

use council_domain::{ConfigIssue, ConfigIssueCode, Model};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Council configuration from TOML
///
/// # Example
///
/// ```toml
/// [council]
/// models = ["openai/gpt-4o", "anthropic/claude-sonnet-4.5", "x-ai/grok-4"]
/// chairman = "google/gemini-2.5-pro"
/// raters = ["openai/gpt-4o"]            # optional, defaults to the council
/// title_model = "google/gemini-2.5-flash"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCouncilConfig {
    /// Council members, in label order
    pub models: Option<Vec<String>>,
    /// Model that writes the synthesis
    pub chairman: Option<String>,
    /// Stage-2 raters
    pub raters: Option<Vec<String>>,
    /// Model used for conversation titles
    pub title_model: Option<String>,
}

impl FileCouncilConfig {
    fn parse_single_model(
        field: &str,
        value: Option<&String>,
    ) -> (Option<Model>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        match value.map(|s| Model::new(s.as_str())) {
            None => (None, issues),
            Some(Ok(model)) => (Some(model), issues),
            Some(Err(_)) => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: field.to_string(),
                    },
                    format!("council.{}: model name cannot be empty", field),
                ));
                (None, issues)
            }
        }
    }

    /// Parse a member list. Empty names and repeats are reported and skipped.
    fn parse_model_list(
        field: &str,
        values: Option<&Vec<String>>,
    ) -> (Option<Vec<Model>>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let Some(strings) = values else {
            return (None, issues);
        };

        let mut models = Vec::new();
        let mut seen = HashSet::new();
        for s in strings {
            let Ok(model) = Model::new(s.as_str()) else {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: field.to_string(),
                    },
                    format!("council.{}: model name cannot be empty in list", field),
                ));
                continue;
            };
            if !seen.insert(model.clone()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateCouncilMember {
                        model: model.to_string(),
                    },
                    format!("council.{}: '{}' is listed more than once", field, model),
                ));
                continue;
            }
            models.push(model);
        }

        if strings.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyCouncil,
                format!("council.{}: list cannot be empty", field),
            ));
        }

        (Some(models), issues)
    }

    pub fn parse_models(&self) -> (Option<Vec<Model>>, Vec<ConfigIssue>) {
        Self::parse_model_list("models", self.models.as_ref())
    }

    pub fn parse_chairman(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        Self::parse_single_model("chairman", self.chairman.as_ref())
    }

    pub fn parse_raters(&self) -> (Option<Vec<Model>>, Vec<ConfigIssue>) {
        Self::parse_model_list("raters", self.raters.as_ref())
    }

    pub fn parse_title_model(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        Self::parse_single_model("title_model", self.title_model.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_council_config_defaults() {
        let config = FileCouncilConfig::default();
        assert!(config.models.is_none());
        assert!(config.chairman.is_none());
        assert!(config.parse_models().0.is_none());
        assert!(config.parse_models().1.is_empty());
    }

    #[test]
    fn test_parse_models_keeps_order() {
        let config = FileCouncilConfig {
            models: Some(vec!["b/two".into(), "a/one".into()]),
            ..Default::default()
        };
        let (models, issues) = config.parse_models();
        let ids: Vec<String> = models.unwrap().iter().map(|m| m.to_string()).collect();
        assert_eq!(ids, vec!["b/two", "a/one"]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_empty_name_in_list() {
        let config = FileCouncilConfig {
            models: Some(vec!["a/one".into(), "  ".into()]),
            ..Default::default()
        };
        let (models, issues) = config.parse_models();
        assert_eq!(models.unwrap().len(), 1);
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::EmptyModelName { field } if field == "models"
        ));
    }

    #[test]
    fn test_duplicate_member() {
        let config = FileCouncilConfig {
            models: Some(vec!["a/one".into(), "a/one".into()]),
            ..Default::default()
        };
        let (models, issues) = config.parse_models();
        assert_eq!(models.unwrap().len(), 1);
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::DuplicateCouncilMember { model } if model == "a/one"
        ));
    }

    #[test]
    fn test_empty_list_is_error() {
        let config = FileCouncilConfig {
            models: Some(vec![]),
            ..Default::default()
        };
        let (_, issues) = config.parse_models();
        assert!(issues.iter().any(|i| i.code == ConfigIssueCode::EmptyCouncil));
    }

    #[test]
    fn test_empty_chairman() {
        let config = FileCouncilConfig {
            chairman: Some(String::new()),
            ..Default::default()
        };
        let (model, issues) = config.parse_chairman();
        assert!(model.is_none());
        assert!(issues[0].is_error());
    }
}
