//! Parallel query executor
//!
//! Sends one prompt to many models at once and waits for all of them.
//! A failing model becomes a failed [`ModelResponse`]; it never cancels the
//! others and never turns into an error of the whole fan-out.

use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::ProgressNotifier;
use council_domain::{ErrorKind, Model, ModelError, ModelResponse, Stage};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The fan-out was cancelled before every call finished.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Query cancelled")]
pub struct Cancelled;

/// Check if cancellation has been requested.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), Cancelled> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(Cancelled);
    }
    Ok(())
}

type TaskOutput = (usize, Model, Result<String, ModelError>);

enum Next {
    Joined(Option<Result<TaskOutput, JoinError>>),
    Cancelled,
}

/// Concurrent fan-out over a gateway
pub struct QueryExecutor<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    timeout: Option<Duration>,
}

impl<G: LlmGateway + 'static> QueryExecutor<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            timeout: None,
        }
    }

    /// Bound every call; expiry is recorded as [`ErrorKind::Timeout`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Query every model with `prompt` and return the replies in `models`
    /// order, whatever order they complete in.
    pub async fn query_all(
        &self,
        models: &[Model],
        prompt: &str,
        stage: Stage,
        progress: &dyn ProgressNotifier,
        cancellation: &Option<CancellationToken>,
    ) -> Result<Vec<ModelResponse>, Cancelled> {
        check_cancelled(cancellation)?;
        debug!(
            "{}: querying {} models with a {} char prompt",
            stage,
            models.len(),
            prompt.len()
        );

        let prompt: Arc<str> = Arc::from(prompt);
        let mut join_set = JoinSet::new();

        for (index, model) in models.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let model = model.clone();
            let prompt = Arc::clone(&prompt);
            let timeout = self.timeout;

            join_set.spawn(async move {
                let result = Self::query_model(gateway.as_ref(), &model, &prompt, timeout).await;
                (index, model, result)
            });
        }

        let mut slots: Vec<Option<ModelResponse>> = vec![None; models.len()];

        loop {
            let next = match cancellation {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => Next::Cancelled,
                    joined = join_set.join_next() => Next::Joined(joined),
                },
                None => Next::Joined(join_set.join_next().await),
            };

            let joined = match next {
                Next::Cancelled => {
                    warn!("{}: cancelled with {} calls in flight", stage, join_set.len());
                    join_set.abort_all();
                    return Err(Cancelled);
                }
                Next::Joined(Some(joined)) => joined,
                Next::Joined(None) => break,
            };

            match joined {
                Ok((index, model, Ok(text))) => {
                    info!("Model {} responded successfully", model);
                    progress.on_task_complete(&stage, &model, true);
                    slots[index] = Some(ModelResponse::success(model, text));
                }
                Ok((index, model, Err(error))) => {
                    warn!("Model {} failed: {}", model, error);
                    progress.on_task_complete(&stage, &model, false);
                    slots[index] = Some(ModelResponse::failure(model, error));
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        Ok(slots
            .into_iter()
            .zip(models)
            .map(|(slot, model)| {
                slot.unwrap_or_else(|| {
                    progress.on_task_complete(&stage, model, false);
                    ModelResponse::failure(
                        model.clone(),
                        ModelError::new(ErrorKind::Upstream, "query task ended without a result"),
                    )
                })
            })
            .collect())
    }

    async fn query_model(
        gateway: &G,
        model: &Model,
        prompt: &str,
        timeout: Option<Duration>,
    ) -> Result<String, ModelError> {
        let call = gateway.send(model, prompt);
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(ModelError::new(
                        ErrorKind::Timeout,
                        format!("no reply within {}ms", limit.as_millis()),
                    ));
                }
            },
            None => call.await,
        };
        result.map_err(|e| e.to_model_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::ports::progress::NoProgress;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Clone)]
    enum Reply {
        Text(&'static str),
        Fail,
        Panic,
    }

    /// Mock gateway with a fixed reply and delay per model
    struct DelayedGateway {
        replies: HashMap<String, (u64, Reply)>,
        calls: Mutex<Vec<String>>,
    }

    impl DelayedGateway {
        fn new(replies: &[(&str, u64, Reply)]) -> Self {
            Self {
                replies: replies
                    .iter()
                    .map(|(m, d, r)| (m.to_string(), (*d, r.clone())))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for DelayedGateway {
        async fn send(&self, model: &Model, _prompt: &str) -> Result<String, GatewayError> {
            self.calls.lock().unwrap().push(model.to_string());
            let (delay, reply) = self.replies[model.as_str()].clone();
            tokio::time::sleep(Duration::from_millis(delay)).await;
            match reply {
                Reply::Text(t) => Ok(t.to_string()),
                Reply::Fail => Err(GatewayError::ConnectionError("refused".to_string())),
                Reply::Panic => panic!("adapter bug"),
            }
        }
    }

    fn models(ids: &[&str]) -> Vec<Model> {
        ids.iter().map(|id| Model::new(*id).unwrap()).collect()
    }

    #[tokio::test]
    async fn test_results_follow_council_order() {
        let gateway = Arc::new(DelayedGateway::new(&[
            ("m/slow", 60, Reply::Text("slow")),
            ("m/mid", 30, Reply::Text("mid")),
            ("m/fast", 0, Reply::Text("fast")),
        ]));
        let executor = QueryExecutor::new(gateway);

        let responses = executor
            .query_all(
                &models(&["m/slow", "m/mid", "m/fast"]),
                "q",
                Stage::Responses,
                &NoProgress,
                &None,
            )
            .await
            .unwrap();

        let texts: Vec<_> = responses.iter().map(|r| r.text().unwrap()).collect();
        assert_eq!(texts, vec!["slow", "mid", "fast"]);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_not_raised() {
        let gateway = Arc::new(DelayedGateway::new(&[
            ("m/a", 0, Reply::Text("ok")),
            ("m/b", 0, Reply::Fail),
        ]));
        let executor = QueryExecutor::new(gateway);

        let responses = executor
            .query_all(&models(&["m/a", "m/b"]), "q", Stage::Responses, &NoProgress, &None)
            .await
            .unwrap();

        assert!(responses[0].is_success());
        let err = responses[1].error().unwrap();
        assert_eq!(err.kind, ErrorKind::Transport);
        assert!(err.message.contains("refused"));
    }

    #[tokio::test]
    async fn test_all_failures_still_return_every_entry() {
        let gateway = Arc::new(DelayedGateway::new(&[
            ("m/a", 0, Reply::Fail),
            ("m/b", 0, Reply::Fail),
        ]));
        let executor = QueryExecutor::new(gateway);

        let responses = executor
            .query_all(&models(&["m/a", "m/b"]), "q", Stage::Responses, &NoProgress, &None)
            .await
            .unwrap();

        assert_eq!(responses.len(), 2);
        assert!(responses.iter().all(|r| !r.is_success()));
        assert_eq!(responses[1].model().as_str(), "m/b");
    }

    #[tokio::test]
    async fn test_timeout_is_recorded_per_model() {
        let gateway = Arc::new(DelayedGateway::new(&[
            ("m/quick", 0, Reply::Text("ok")),
            ("m/stuck", 5_000, Reply::Text("late")),
        ]));
        let executor =
            QueryExecutor::new(gateway).with_timeout(Some(Duration::from_millis(50)));

        let responses = executor
            .query_all(
                &models(&["m/quick", "m/stuck"]),
                "q",
                Stage::Responses,
                &NoProgress,
                &None,
            )
            .await
            .unwrap();

        assert_eq!(responses[0].text(), Some("ok"));
        assert_eq!(responses[1].error().unwrap().kind, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_upstream_error() {
        let gateway = Arc::new(DelayedGateway::new(&[
            ("m/a", 0, Reply::Panic),
            ("m/b", 0, Reply::Text("fine")),
        ]));
        let executor = QueryExecutor::new(gateway);

        let responses = executor
            .query_all(&models(&["m/a", "m/b"]), "q", Stage::Responses, &NoProgress, &None)
            .await
            .unwrap();

        assert_eq!(responses[0].model().as_str(), "m/a");
        assert_eq!(responses[0].error().unwrap().kind, ErrorKind::Upstream);
        assert_eq!(responses[1].text(), Some("fine"));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_fan_out() {
        let gateway = Arc::new(DelayedGateway::new(&[
            ("m/a", 5_000, Reply::Text("never")),
            ("m/b", 5_000, Reply::Text("never")),
        ]));
        let executor = QueryExecutor::new(gateway);
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let result = executor
            .query_all(
                &models(&["m/a", "m/b"]),
                "q",
                Stage::Rankings,
                &NoProgress,
                &Some(token),
            )
            .await;

        assert_eq!(result.unwrap_err(), Cancelled);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_calls() {
        let gateway = Arc::new(DelayedGateway::new(&[("m/a", 0, Reply::Text("x"))]));
        let executor = QueryExecutor::new(Arc::clone(&gateway));
        let token = CancellationToken::new();
        token.cancel();

        let result = executor
            .query_all(&models(&["m/a"]), "q", Stage::Responses, &NoProgress, &Some(token))
            .await;

        assert!(result.is_err());
        assert!(gateway.calls.lock().unwrap().is_empty());
    }
}
