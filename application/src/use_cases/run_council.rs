//! Run Council use case
//!
//! Orchestrates one deliberation: answers, anonymous peer rankings, and the
//! chairman's synthesis.

use crate::config::CouncilConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_type,
};
use crate::ports::llm_gateway::{LlmGateway, StreamEvent};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::query_executor::{Cancelled, QueryExecutor};
use council_domain::{
    AnonymizedSet, CouncilPrompt, DeliberationResult, DeliberationState, DomainError, ErrorKind,
    Label, Model, ModelError, ModelResponse, Question, RankingSubmission, RaterFailure, Stage,
    Stage2Result, Synthesis, aggregate_rankings, parse_ranking,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort a deliberation
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("No models configured")]
    NoModels,

    #[error("All models failed to respond")]
    AllModelsFailed,

    #[error("Deliberation cancelled")]
    Cancelled,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<Cancelled> for RunCouncilError {
    fn from(_: Cancelled) -> Self {
        RunCouncilError::Cancelled
    }
}

/// Use case for running a council deliberation
pub struct RunCouncilUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    config: CouncilConfig,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: LlmGateway + 'static> RunCouncilUseCase<G> {
    pub fn new(gateway: Arc<G>, config: CouncilConfig) -> Self {
        Self {
            gateway,
            config,
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Cancelling the token aborts in-flight calls and fails with
    /// [`RunCouncilError::Cancelled`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn config(&self) -> &CouncilConfig {
        &self.config
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, question: Question) -> Result<DeliberationResult, RunCouncilError> {
        self.execute_with_progress(question, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        question: Question,
        progress: &dyn ProgressNotifier,
    ) -> Result<DeliberationResult, RunCouncilError> {
        if self.config.council().is_empty() {
            return Err(RunCouncilError::NoModels);
        }

        info!(
            "Starting deliberation with {} models, chairman {}",
            self.config.council().len(),
            self.config.synthesis_model()
        );

        let executor = QueryExecutor::new(Arc::clone(&self.gateway))
            .with_timeout(self.config.params().model_timeout);
        let mut state = DeliberationState::default();

        // Stage 1: Responses
        let stage1 = self.stage_responses(&executor, &question, progress).await?;
        let set = AnonymizedSet::from_responses(&stage1);
        if set.is_empty() {
            warn!("All {} council members failed", stage1.len());
            return Err(RunCouncilError::AllModelsFailed);
        }
        state = state.advance()?;

        // Stage 2: Rankings
        state = state.advance()?;
        let stage2 = self
            .stage_rankings(&executor, &question, &set, progress)
            .await?;
        state = state.advance()?;

        // Stage 3: Synthesis
        state = state.advance()?;
        let stage3 = self
            .stage_synthesis(&question, &set, &stage2, progress)
            .await?;
        state = match stage3 {
            Synthesis::Completed { .. } => state.advance()?,
            Synthesis::Failed { .. } => state.fail()?,
        };

        info!("Deliberation finished: {}", state);
        Ok(DeliberationResult {
            question,
            state,
            stage1,
            stage2,
            stage3,
        })
    }

    async fn stage_responses(
        &self,
        executor: &QueryExecutor<G>,
        question: &Question,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<ModelResponse>, RunCouncilError> {
        info!("{}", Stage::Responses);
        let council = self.config.council();
        progress.on_stage_start(&Stage::Responses, council.len());

        let prompt = CouncilPrompt::initial_query(question.content());
        let responses = executor
            .query_all(
                council,
                &prompt,
                Stage::Responses,
                progress,
                &self.cancellation_token,
            )
            .await?;

        for response in &responses {
            self.conversation_logger.log(ConversationEvent::new(
                event_type::STAGE1_RESPONSE,
                serde_json::json!({
                    "model": response.model(),
                    "text": response.text(),
                    "error": response.error(),
                }),
            ));
        }

        progress.on_stage_complete(&Stage::Responses);
        Ok(responses)
    }

    async fn stage_rankings(
        &self,
        executor: &QueryExecutor<G>,
        question: &Question,
        set: &AnonymizedSet,
        progress: &dyn ProgressNotifier,
    ) -> Result<Stage2Result, RunCouncilError> {
        info!("{}", Stage::Rankings);
        let raters = self.config.raters();
        progress.on_stage_start(&Stage::Rankings, raters.len());

        let labels: Vec<Label> = set.labels().cloned().collect();
        let prompt = CouncilPrompt::ranking_prompt(question.content(), set.entries());
        let replies = executor
            .query_all(
                raters,
                &prompt,
                Stage::Rankings,
                progress,
                &self.cancellation_token,
            )
            .await?;

        let mut rankings = Vec::new();
        let mut failures = Vec::new();

        for reply in replies {
            if let Some(text) = reply.text() {
                let parsed = parse_ranking(text, &labels);
                debug!(
                    "Rater {} ranking: {} labels via {:?}",
                    reply.model(),
                    parsed.order.len(),
                    parsed.strategy
                );
                let submission = RankingSubmission {
                    rater: reply.model().clone(),
                    raw_text: text.to_string(),
                    parsed_order: parsed.order,
                    parse_strategy: parsed.strategy,
                };
                self.conversation_logger.log(ConversationEvent::new(
                    event_type::RANKING_SUBMISSION,
                    serde_json::json!({
                        "rater": submission.rater,
                        "parsed_order": submission.parsed_order,
                        "parse_strategy": submission.parse_strategy,
                        "raw_text": submission.raw_text,
                    }),
                ));
                rankings.push(submission);
            } else if let Some(error) = reply.error() {
                failures.push(RaterFailure {
                    rater: reply.model().clone(),
                    error: error.clone(),
                });
            }
        }

        let aggregate = if rankings.is_empty() {
            warn!("No rater produced a ranking; continuing without peer rankings");
            Vec::new()
        } else {
            aggregate_rankings(&rankings, set)
        };

        self.conversation_logger.log(ConversationEvent::new(
            event_type::AGGREGATE_RANKING,
            serde_json::json!({ "aggregate": aggregate }),
        ));

        progress.on_stage_complete(&Stage::Rankings);
        Ok(Stage2Result {
            rankings,
            failures,
            label_to_model: set.label_to_model(),
            aggregate,
        })
    }

    async fn stage_synthesis(
        &self,
        question: &Question,
        set: &AnonymizedSet,
        stage2: &Stage2Result,
        progress: &dyn ProgressNotifier,
    ) -> Result<Synthesis, RunCouncilError> {
        info!("{}", Stage::Synthesis);
        progress.on_stage_start(&Stage::Synthesis, 1);

        let chairman = self.config.synthesis_model();
        let responses: Vec<(Model, String)> = set
            .entries()
            .iter()
            .map(|e| (e.model.clone(), e.text.clone()))
            .collect();
        let prompt = CouncilPrompt::synthesis_prompt(
            question.content(),
            &responses,
            &stage2.rankings,
            &stage2.label_to_model,
            &stage2.aggregate,
        );
        debug!("Synthesis prompt is {} chars", prompt.len());

        let outcome = match &self.cancellation_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(RunCouncilError::Cancelled),
                outcome = self.synthesize(chairman, &prompt, progress) => outcome,
            },
            None => self.synthesize(chairman, &prompt, progress).await,
        };

        let synthesis = match outcome {
            Ok(text) => {
                info!("Chairman {} completed synthesis", chairman);
                progress.on_task_complete(&Stage::Synthesis, chairman, true);
                Synthesis::Completed {
                    model: chairman.clone(),
                    text,
                }
            }
            Err(error) => {
                warn!("Chairman {} failed: {}", chairman, error);
                progress.on_task_complete(&Stage::Synthesis, chairman, false);
                Synthesis::Failed {
                    model: chairman.clone(),
                    error,
                }
            }
        };

        self.conversation_logger.log(ConversationEvent::new(
            event_type::SYNTHESIS,
            serde_json::json!({
                "model": chairman,
                "text": synthesis.text(),
                "error": match &synthesis {
                    Synthesis::Failed { error, .. } => Some(error),
                    Synthesis::Completed { .. } => None,
                },
            }),
        ));

        progress.on_stage_complete(&Stage::Synthesis);
        Ok(synthesis)
    }

    /// Stream the chairman's reply, forwarding chunks to `progress`.
    async fn synthesize(
        &self,
        chairman: &Model,
        prompt: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<String, ModelError> {
        let call = async {
            let mut handle = self
                .gateway
                .send_streaming(chairman, prompt)
                .await
                .map_err(|e| e.to_model_error())?;

            progress.on_model_stream_start(chairman);
            let mut text = String::new();
            let mut failure = None;
            while let Some(event) = handle.receiver.recv().await {
                match event {
                    StreamEvent::Delta(chunk) => {
                        progress.on_model_stream_chunk(chairman, &chunk);
                        text.push_str(&chunk);
                    }
                    StreamEvent::Completed(full) => {
                        if text.is_empty() {
                            progress.on_model_stream_chunk(chairman, &full);
                            text = full;
                        }
                        break;
                    }
                    StreamEvent::Error(e) => {
                        failure = Some(ModelError::new(ErrorKind::Upstream, e));
                        break;
                    }
                }
            }
            progress.on_model_stream_end(chairman);

            match failure {
                Some(error) => Err(error),
                None => Ok(text),
            }
        };

        match self.config.params().model_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(ModelError::new(
                    ErrorKind::Timeout,
                    format!("no reply within {}ms", limit.as_millis()),
                ))
            }),
            None => call.await,
        }
    }
}
