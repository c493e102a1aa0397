//! Retrying request executor.
//!
//! Sends one user input to the provider and, on failure, retries with
//! exponential backoff until it either succeeds or runs out of retries.
//!
//! The executor is a small explicit state machine:
//!
//! ```text
//! Attempting --ok--> Succeeded
//! Attempting --err, attempt < max--> WaitingToRetry --delay--> Attempting
//! Attempting --err, attempt == max--> Exhausted
//! ```
//!
//! Only provider errors consume the retry budget. A successful response
//! without any choices is `Reply::Empty`, not a failure.

use std::time::Duration;

use tracing::{debug, info, warn};

use termchat_types::config::RetryConfig;
use termchat_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use super::backoff;
use crate::llm::provider::LlmProvider;

/// What the provider answered for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text of the first choice.
    Content(String),
    /// The provider succeeded but supplied no choice (or a choice with
    /// null content).
    Empty,
}

impl Reply {
    fn from_response(response: CompletionResponse) -> Self {
        match response.content {
            Some(text) => Reply::Content(text),
            None => Reply::Empty,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Content(text) => Some(text),
            Reply::Empty => None,
        }
    }
}

/// Every attempt for an input failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("request failed after {attempts} attempt(s): {last_error}")]
pub struct Exhausted {
    /// Total number of provider calls made.
    pub attempts: u32,
    pub last_error: LlmError,
}

/// Diagnostics emitted while an input is being retried.
#[derive(Debug, Clone)]
pub enum RetryNotice {
    /// Attempt number `attempt` (1-based) failed.
    AttemptFailed { attempt: u32, error: LlmError },
    /// Retry number `retry` (1-based) will be sent after `delay`.
    RetryScheduled { retry: u32, delay: Duration },
}

/// States of a single execution. `attempt` is the zero-based retry counter.
#[derive(Debug)]
enum State {
    Attempting { attempt: u32 },
    WaitingToRetry { attempt: u32, delay: Duration },
    Succeeded(Reply),
    Exhausted(Exhausted),
}

/// Runs one input through the provider with bounded exponential backoff.
pub struct RetryingExecutor<P> {
    provider: P,
    model: String,
    retry: RetryConfig,
}

impl<P: LlmProvider> RetryingExecutor<P> {
    pub fn new(provider: P, model: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            provider,
            model: model.into(),
            retry,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Execute without observing retries (they are still logged).
    pub async fn execute(&self, input: &str) -> Result<Reply, Exhausted> {
        self.execute_with(input, |_| {}).await
    }

    /// Execute `input`, reporting each failed attempt and each scheduled
    /// retry to `on_notice` before acting on it.
    ///
    /// Returns only once a terminal state is reached.
    pub async fn execute_with<F>(&self, input: &str, mut on_notice: F) -> Result<Reply, Exhausted>
    where
        F: FnMut(&RetryNotice),
    {
        let request = CompletionRequest::single_turn(&self.model, input);
        let mut state = State::Attempting { attempt: 0 };

        loop {
            state = match state {
                State::Attempting { attempt } => {
                    debug!(
                        provider = self.provider.name(),
                        model = %self.model,
                        attempt = attempt + 1,
                        "Sending completion request"
                    );
                    match self.provider.complete(&request).await {
                        Ok(response) => {
                            debug!(
                                response_id = %response.id,
                                response_model = %response.model,
                                has_content = response.content.is_some(),
                                "Completion succeeded"
                            );
                            State::Succeeded(Reply::from_response(response))
                        }
                        Err(error) => {
                            warn!(attempt = attempt + 1, error = %error, "Completion attempt failed");
                            on_notice(&RetryNotice::AttemptFailed {
                                attempt: attempt + 1,
                                error: error.clone(),
                            });

                            if backoff::should_retry(&self.retry, attempt) {
                                State::WaitingToRetry {
                                    attempt,
                                    delay: backoff::delay_for(self.retry.initial_delay(), attempt),
                                }
                            } else {
                                State::Exhausted(Exhausted {
                                    attempts: attempt + 1,
                                    last_error: error,
                                })
                            }
                        }
                    }
                }
                State::WaitingToRetry { attempt, delay } => {
                    info!(
                        retry = attempt + 1,
                        delay_ms = backoff::delay_millis(delay),
                        "Retrying after backoff"
                    );
                    on_notice(&RetryNotice::RetryScheduled {
                        retry: attempt + 1,
                        delay,
                    });
                    tokio::time::sleep(delay).await;
                    State::Attempting {
                        attempt: attempt + 1,
                    }
                }
                State::Succeeded(reply) => return Ok(reply),
                State::Exhausted(exhausted) => {
                    warn!(attempts = exhausted.attempts, "Giving up on request");
                    return Err(exhausted);
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use crate::llm::box_provider::BoxLlmProvider;

    // --- Mock provider ---

    /// Plays back scripted outcomes; once the script runs out it repeats
    /// the fallback outcome.
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<Option<String>, LlmError>>>,
        fallback: Result<Option<String>, LlmError>,
        calls: AtomicU32,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(
            script: Vec<Result<Option<String>, LlmError>>,
            fallback: Result<Option<String>, LlmError>,
        ) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicU32::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn always_failing() -> Self {
            Self::new(
                vec![],
                Err(LlmError::Provider {
                    message: "connection refused".to_string(),
                }),
            )
        }

        fn failing_then(n: usize, text: &str) -> Self {
            let mut script: Vec<_> = (0..n)
                .map(|i| {
                    Err(LlmError::Provider {
                        message: format!("failure {}", i + 1),
                    })
                })
                .collect();
            script.push(Ok(Some(text.to_string())));
            Self::new(script, Ok(Some("unexpected extra call".to_string())))
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            next.map(|content| CompletionResponse {
                id: "resp-1".to_string(),
                model: request.model.clone(),
                content,
            })
        }
    }

    fn retry(max_retries: u32, initial_delay_ms: u64) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms,
        }
    }

    // --- Succeeded ---

    #[tokio::test]
    async fn test_first_attempt_success() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::failing_then(0, "Hello there"),
            "gpt-3.5-turbo",
            RetryConfig::default(),
        );

        let mut notices = Vec::new();
        let reply = executor
            .execute_with("Hi", |n| notices.push(n.clone()))
            .await
            .unwrap();

        assert_eq!(reply, Reply::Content("Hello there".to_string()));
        assert_eq!(executor.provider().calls(), 1);
        assert!(notices.is_empty());
    }

    #[tokio::test]
    async fn test_request_is_single_user_message_with_model() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::failing_then(0, "ok"),
            "gpt-4",
            RetryConfig::default(),
        );
        executor.execute("What is Rust?").await.unwrap();

        let request = executor.provider().last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request, CompletionRequest::single_turn("gpt-4", "What is Rust?"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        for n in 0..3usize {
            let executor = RetryingExecutor::new(
                ScriptedProvider::failing_then(n, "final answer"),
                "gpt-3.5-turbo",
                RetryConfig::default(),
            );

            let reply = executor.execute("question").await.unwrap();
            assert_eq!(reply.text(), Some("final answer"));
            assert_eq!(executor.provider().calls(), n as u32 + 1);
        }
    }

    #[tokio::test]
    async fn test_no_choices_is_empty_reply_not_error() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::new(vec![Ok(None)], Err(LlmError::Timeout)),
            "gpt-3.5-turbo",
            RetryConfig::default(),
        );

        let reply = executor.execute("hello").await.unwrap();
        assert_eq!(reply, Reply::Empty);
        assert!(reply.text().is_none());
        // Empty success must not consume retry budget
        assert_eq!(executor.provider().calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_content_is_passed_through() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::new(vec![Ok(Some("  \n".to_string()))], Err(LlmError::Timeout)),
            "gpt-3.5-turbo",
            RetryConfig::default(),
        );
        assert_eq!(
            executor.execute("hello").await.unwrap(),
            Reply::Content("  \n".to_string())
        );
        assert_eq!(executor.provider().calls(), 1);
    }

    // --- Exhausted ---

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_exhausts_after_max_plus_one_attempts() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::always_failing(),
            "gpt-3.5-turbo",
            RetryConfig::default(),
        );

        let err = executor.execute("hello").await.unwrap_err();
        assert_eq!(err.attempts, 4);
        assert_eq!(executor.provider().calls(), 4);
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_never_exceed_budget() {
        for max_retries in 0..6 {
            let executor = RetryingExecutor::new(
                ScriptedProvider::always_failing(),
                "m",
                retry(max_retries, 50),
            );
            let err = executor.execute("x").await.unwrap_err();
            assert_eq!(err.attempts, max_retries + 1);
            assert_eq!(executor.provider().calls(), max_retries + 1);
        }
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::failing_then(1, "never reached"),
            "m",
            retry(0, 2000),
        );
        let err = executor.execute("x").await.unwrap_err();
        assert_eq!(err.attempts, 1);
        assert!(matches!(err.last_error, LlmError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_every_error_kind_is_retried() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::new(
                vec![
                    Err(LlmError::AuthenticationFailed),
                    Err(LlmError::RateLimited),
                    Err(LlmError::Timeout),
                ],
                Ok(Some("made it".to_string())),
            ),
            "m",
            retry(3, 0),
        );
        let reply = executor.execute("x").await.unwrap();
        assert_eq!(reply.text(), Some("made it"));
        assert_eq!(executor.provider().calls(), 4);
    }

    // --- Notices and timing ---

    #[tokio::test(start_paused = true)]
    async fn test_notices_and_delays_follow_schedule() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::always_failing(),
            "gpt-3.5-turbo",
            RetryConfig::default(),
        );

        let mut failed = Vec::new();
        let mut delays = Vec::new();
        let _ = executor
            .execute_with("hello", |notice| match notice {
                RetryNotice::AttemptFailed { attempt, .. } => failed.push(*attempt),
                RetryNotice::RetryScheduled { retry, delay } => delays.push((*retry, *delay)),
            })
            .await;

        assert_eq!(failed, vec![1, 2, 3, 4]);
        assert_eq!(
            delays,
            vec![
                (1, Duration::from_millis(2000)),
                (2, Duration::from_millis(4000)),
                (3, Duration::from_millis(8000)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_actually_waits() {
        let executor = RetryingExecutor::new(
            ScriptedProvider::failing_then(2, "done"),
            "m",
            retry(3, 1000),
        );

        let start = Instant::now();
        executor.execute("x").await.unwrap();
        // 1s before retry 1, 2s before retry 2
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3000), "waited only {elapsed:?}");
        assert!(elapsed < Duration::from_millis(3100), "waited {elapsed:?}");
    }

    #[tokio::test]
    async fn test_works_through_box_provider() {
        let executor = RetryingExecutor::new(
            BoxLlmProvider::new(ScriptedProvider::failing_then(1, "boxed")),
            "m",
            retry(1, 0),
        );
        let reply = executor.execute("x").await.unwrap();
        assert_eq!(reply.text(), Some("boxed"));
        assert_eq!(executor.provider().name(), "scripted");
    }
}
