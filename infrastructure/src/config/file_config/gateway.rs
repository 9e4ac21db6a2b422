//! Gateway settings from TOML (`[gateway]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Raw gateway configuration from TOML
///
/// The API key itself never lives in the file; `api_key_env` names the
/// environment variable that holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Chat-completions endpoint
    pub api_url: String,
    /// Environment variable holding the bearer token
    pub api_key_env: String,
    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 120,
        }
    }
}

impl FileGatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_defaults() {
        let config = FileGatewayConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_gateway_section() {
        let config: super::super::FileConfig = toml::from_str(
            r#"
[gateway]
timeout_secs = 30
"#,
        )
        .unwrap();
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.gateway.api_url, DEFAULT_API_URL);
    }
}
