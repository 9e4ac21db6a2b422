//! Generate Title use case
//!
//! Asks a lightweight model for a short conversation title. Never fails:
//! any problem yields [`FALLBACK_TITLE`].

use crate::ports::llm_gateway::LlmGateway;
use council_domain::core::string::truncate_chars;
use council_domain::{CouncilPrompt, Model, Question};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const FALLBACK_TITLE: &str = "New Conversation";

const MAX_TITLE_CHARS: usize = 50;

/// Use case for titling a conversation from its first question
pub struct GenerateTitleUseCase<G: LlmGateway> {
    gateway: Arc<G>,
    model: Model,
    timeout: Duration,
}

impl<G: LlmGateway> GenerateTitleUseCase<G> {
    pub fn new(gateway: Arc<G>, model: Model) -> Self {
        Self {
            gateway,
            model,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn execute(&self, question: &Question) -> String {
        let prompt = CouncilPrompt::title_prompt(question.content());
        let reply =
            tokio::time::timeout(self.timeout, self.gateway.send(&self.model, &prompt)).await;

        match reply {
            Ok(Ok(raw)) => {
                let title = normalize_title(&raw);
                debug!("Generated title {:?} with {}", title, self.model);
                title
            }
            Ok(Err(e)) => {
                warn!("Title generation with {} failed: {}", self.model, e);
                FALLBACK_TITLE.to_string()
            }
            Err(_) => {
                warn!(
                    "Title generation with {} timed out after {}s",
                    self.model,
                    self.timeout.as_secs()
                );
                FALLBACK_TITLE.to_string()
            }
        }
    }
}

/// Trim, strip surrounding quotes, cap at 50 characters.
pub fn normalize_title(raw: &str) -> String {
    let title = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if title.is_empty() {
        return FALLBACK_TITLE.to_string();
    }
    truncate_chars(title, MAX_TITLE_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;

    enum TitleReply {
        Text(&'static str),
        Fail,
        Slow,
    }

    struct TitleGateway(TitleReply);

    #[async_trait]
    impl LlmGateway for TitleGateway {
        async fn send(&self, _model: &Model, _prompt: &str) -> Result<String, GatewayError> {
            match self.0 {
                TitleReply::Text(t) => Ok(t.to_string()),
                TitleReply::Fail => Err(GatewayError::ConnectionError("down".to_string())),
                TitleReply::Slow => {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok("Too Late".to_string())
                }
            }
        }
    }

    fn use_case(reply: TitleReply) -> GenerateTitleUseCase<TitleGateway> {
        GenerateTitleUseCase::new(Arc::new(TitleGateway(reply)), Model::default_title_model())
    }

    fn question() -> Question {
        Question::new("How do ocean tides work?").unwrap()
    }

    #[test]
    fn test_normalize_strips_quotes_and_whitespace() {
        assert_eq!(normalize_title("  \"Ocean Tides Explained\"\n"), "Ocean Tides Explained");
        assert_eq!(normalize_title("'Tides'"), "Tides");
    }

    #[test]
    fn test_normalize_truncates_long_titles() {
        let long = "A".repeat(60);
        let title = normalize_title(&long);
        assert_eq!(title.chars().count(), 50);
        assert!(title.ends_with("..."));
        assert_eq!(&title[..47], &long[..47]);

        let exact = "B".repeat(50);
        assert_eq!(normalize_title(&exact), exact);
    }

    #[test]
    fn test_normalize_empty_falls_back() {
        assert_eq!(normalize_title("  \"\" "), FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn test_execute_returns_normalized_title() {
        let title = use_case(TitleReply::Text("\"Ocean Tides\"")).execute(&question()).await;
        assert_eq!(title, "Ocean Tides");
    }

    #[tokio::test]
    async fn test_execute_falls_back_on_error() {
        let title = use_case(TitleReply::Fail).execute(&question()).await;
        assert_eq!(title, FALLBACK_TITLE);
    }

    #[tokio::test]
    async fn test_execute_falls_back_on_timeout() {
        let title = use_case(TitleReply::Slow)
            .with_timeout(Duration::from_millis(20))
            .execute(&question())
            .await;
        assert_eq!(title, FALLBACK_TITLE);
    }
}
