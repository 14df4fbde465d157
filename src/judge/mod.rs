//! The Judge: an LLM-backed evaluator behind an async trait.
//!
//! A Judge takes an opaque message and an instruction and returns a structured
//! Verdict. The LLM implementation constrains the reply to the expected
//! verdict shape via a JSON schema, retries transient transport failures with
//! exponential backoff, and records every call to the observability sink.
//! Two calls with identical arguments may return different verdicts; nothing
//! here assumes idempotence.

pub mod verdict;

pub use verdict::{Feedback, Verdict, VerdictShape};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{JudgrError, Result};
use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::tracking::{CallRecord, TrackingSink};

/// Black-box evaluator: message + instruction in, Verdict out.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn evaluate(&self, message: &str, instruction: &str) -> Result<Verdict>;
}

/// Retry policy for transient Judge failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Cap on any single backoff delay.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Backoff for the given retry (0-based): initial * 2^attempt, capped.
    /// A rate-limit hint from the API takes precedence when longer.
    fn backoff_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let exp = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_backoff);
        hint.map(|h| h.max(exp)).unwrap_or(exp).min(self.max_backoff)
    }
}

/// LLM-backed Judge implementation.
pub struct LlmJudge {
    client: Arc<dyn LlmClient>,
    tracker: Arc<dyn TrackingSink>,
    shape: VerdictShape,
    retry: RetryConfig,
    max_tokens: Option<u32>,
}

impl LlmJudge {
    /// Create a Judge over the given client, expecting the given verdict shape.
    pub fn new(client: Arc<dyn LlmClient>, tracker: Arc<dyn TrackingSink>, shape: VerdictShape) -> Self {
        Self {
            client,
            tracker,
            shape,
            retry: RetryConfig::default(),
            max_tokens: None,
        }
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set max tokens for Judge replies.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The verdict shape this Judge expects.
    pub fn shape(&self) -> VerdictShape {
        self.shape
    }

    /// Issue one completion with bounded retries on transient failures.
    async fn complete_with_retry(&self, request: CompletionRequest) -> Result<String> {
        let mut attempt = 0u32;

        loop {
            match self.client.complete(request.clone()).await {
                Ok(response) => {
                    if response.finish_reason.is_truncated() {
                        return Err(JudgrError::SchemaViolation(
                            "judge reply truncated before completing the verdict".to_string(),
                        ));
                    }
                    return Ok(response.content);
                }
                Err(e) if e.is_retryable() && attempt + 1 < self.retry.max_attempts => {
                    let hint = match &e {
                        LlmError::RateLimited { retry_after } => Some(*retry_after),
                        _ => None,
                    };
                    let delay = self.retry.backoff_for(attempt, hint);
                    tracing::warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Judge call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(lift_llm_error(e)),
            }
        }
    }
}

#[async_trait]
impl Judge for LlmJudge {
    async fn evaluate(&self, message: &str, instruction: &str) -> Result<Verdict> {
        let mut request = CompletionRequest::new(instruction)
            .with_user_message(message)
            .with_schema(self.shape.response_schema());
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        let raw = self.complete_with_retry(request).await?;

        // Fire-and-forget: sink failures never affect the loop
        let record = CallRecord::new(self.shape.call_name(), instruction, message, raw.as_str());
        if let Err(e) = self.tracker.record(&record) {
            log::warn!("Failed to record judge call: {}", e);
        }

        Verdict::parse(&raw, self.shape)
    }
}

/// Map transport errors into the crate's taxonomy.
fn lift_llm_error(e: LlmError) -> JudgrError {
    match e {
        LlmError::InvalidResponse(m) => JudgrError::SchemaViolation(m),
        LlmError::JsonError(e) => JudgrError::SchemaViolation(e.to_string()),
        LlmError::MissingApiKey { env_var } => {
            JudgrError::Configuration(format!("{} not set", env_var))
        }
        other => JudgrError::JudgeUnavailable(other.to_string()),
    }
}
