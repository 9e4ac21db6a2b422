//! Model value object representing a backend LLM

use super::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque backend model identifier (Value Object)
///
/// The identifier is passed to the gateway verbatim, e.g.
/// `"openai/gpt-4o"` or `"anthropic/claude-sonnet-4.5"` for OpenRouter.
/// The only rule enforced here is that it is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Model(String);

impl Model {
    /// Create a model identifier, rejecting blank names.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidModel(
                "model identifier cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The default council, matching the free-tier OpenRouter line-up.
    pub fn default_council() -> Vec<Model> {
        [
            "tngtech/tng-r1t-chimera:free",
            "openrouter/bert-nebulon-alpha",
            "x-ai/grok-4.1-fast:free",
            "kwaipilot/kat-coder-pro:free",
        ]
        .into_iter()
        .map(|id| Model(id.to_string()))
        .collect()
    }

    /// Default synthesis model.
    pub fn default_chairman() -> Model {
        Model("tngtech/tng-r1t-chimera:free".to_string())
    }

    /// Cheap model used for conversation titles.
    pub fn default_title_model() -> Model {
        Model("google/gemini-2.5-flash".to_string())
    }

    /// Short display name without the provider prefix.
    ///
    /// E.g., "openai/gpt-4o" -> "gpt-4o"
    pub fn short_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::new(s)
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        for model in Model::default_council() {
            let parsed: Model = model.to_string().parse().unwrap();
            assert_eq!(model, parsed);
        }
    }

    #[test]
    fn test_blank_model_rejected() {
        assert!(Model::new("").is_err());
        assert!("   ".parse::<Model>().is_err());
    }

    #[test]
    fn test_model_is_trimmed() {
        let model = Model::new("  openai/gpt-4o ").unwrap();
        assert_eq!(model.as_str(), "openai/gpt-4o");
    }

    #[test]
    fn test_short_name() {
        let model = Model::new("openai/gpt-4o").unwrap();
        assert_eq!(model.short_name(), "gpt-4o");

        let bare = Model::new("local-llama").unwrap();
        assert_eq!(bare.short_name(), "local-llama");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let model = Model::new("x-ai/grok-4").unwrap();
        assert_eq!(serde_json::to_string(&model).unwrap(), "\"x-ai/grok-4\"");

        let back: Model = serde_json::from_str("\"x-ai/grok-4\"").unwrap();
        assert_eq!(back, model);
        assert!(serde_json::from_str::<Model>("\"\"").is_err());
    }
}
