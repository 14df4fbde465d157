//! Convergence loop - re-submits evaluations to the Judge until it declares
//! success.
//!
//! The loop is a small state machine: START (no verdict yet), PENDING (holding
//! a non-final verdict), DONE (terminal). Each iteration composes a message
//! from the fixed transcript plus the prior verdict's feedback, invokes the
//! Judge, and re-evaluates. The Judge is a nondeterministic oracle, so the
//! loop is a bounded retry protocol: iterations are capped and exceeding the
//! cap is an explicit failure, never an unbounded spin.

use std::sync::Arc;

use crate::error::{JudgrError, Result};
use crate::judge::{Judge, Verdict};
use crate::runner::strategy::FeedbackStrategy;

/// Bounds for one convergence run.
#[derive(Debug, Clone)]
pub struct ConvergenceConfig {
    /// Maximum Judge calls per transcript.
    pub max_iterations: u32,
    /// Consecutive empty-findings failures tolerated before declaring a stall.
    pub stall_threshold: u32,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            stall_threshold: 3,
        }
    }
}

/// Result of a converged run: the final verdict and the Judge calls consumed.
#[derive(Debug, Clone)]
pub struct LoopReport {
    pub iterations: u32,
    pub verdict: Verdict,
}

/// Per-transcript convergence driver.
///
/// Loop state (current verdict, current instruction, iteration counter) lives
/// entirely inside `run` and is created fresh per call; nothing carries over
/// between transcripts.
pub struct ConvergenceLoop {
    judge: Arc<dyn Judge>,
    strategy: Arc<dyn FeedbackStrategy>,
    config: ConvergenceConfig,
}

impl ConvergenceLoop {
    /// Create a loop over the given Judge and feedback strategy.
    pub fn new(judge: Arc<dyn Judge>, strategy: Arc<dyn FeedbackStrategy>) -> Self {
        Self {
            judge,
            strategy,
            config: ConvergenceConfig::default(),
        }
    }

    /// Set the loop bounds.
    pub fn with_config(mut self, config: ConvergenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the loop for one transcript until the Judge declares success.
    ///
    /// Returns `ConvergenceTimeout` when the iteration cap is exhausted and
    /// `ConvergenceStalled` when the Judge repeatedly fails the verdict while
    /// offering no feedback to fold back in.
    pub async fn run(&self, transcript: &str) -> Result<LoopReport> {
        let mut instruction = self.strategy.seed_instruction().to_string();
        let mut message = self.strategy.first_message(transcript);
        let mut iterations = 0u32;
        let mut consecutive_stalls = 0u32;

        loop {
            if iterations >= self.config.max_iterations {
                return Err(JudgrError::ConvergenceTimeout { iterations });
            }

            let verdict = self.judge.evaluate(&message, &instruction).await?;
            iterations += 1;

            log::info!(
                "Iteration {}: success={} feedback={}",
                iterations,
                verdict.success,
                verdict.feedback.render()
            );

            if verdict.success {
                return Ok(LoopReport { iterations, verdict });
            }

            if verdict.is_empty_failure() {
                consecutive_stalls += 1;
                if consecutive_stalls >= self.config.stall_threshold {
                    return Err(JudgrError::ConvergenceStalled { iterations });
                }
            } else {
                consecutive_stalls = 0;
            }

            message = self.strategy.compose(transcript, &instruction, &verdict);
            instruction = self.strategy.next_instruction(&instruction, &verdict);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{Feedback, VerdictShape};
    use crate::runner::strategy::{AppendFindings, ReplaceInstruction};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Judge stub that fails with the given findings until call k, then succeeds.
    struct SucceedsOnCall {
        succeed_on: u32,
        calls: AtomicU32,
        findings: Vec<String>,
        captured: Mutex<Vec<(String, String)>>,
    }

    impl SucceedsOnCall {
        fn new(succeed_on: u32, findings: &[&str]) -> Self {
            Self {
                succeed_on,
                calls: AtomicU32::new(0),
                findings: findings.iter().map(|s| s.to_string()).collect(),
                captured: Mutex::new(Vec::new()),
            }
        }

        fn calls_made(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Judge for SucceedsOnCall {
        async fn evaluate(&self, message: &str, instruction: &str) -> Result<Verdict> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.captured
                .lock()
                .unwrap()
                .push((message.to_string(), instruction.to_string()));
            Ok(Verdict {
                success: call >= self.succeed_on,
                feedback: Feedback::ActionItems(self.findings.clone()),
            })
        }
    }

    fn append_loop(judge: Arc<dyn Judge>, max_iterations: u32) -> ConvergenceLoop {
        ConvergenceLoop::new(judge, Arc::new(AppendFindings::with_instruction("seed")))
            .with_config(ConvergenceConfig {
                max_iterations,
                stall_threshold: 3,
            })
    }

    #[tokio::test]
    async fn test_iteration_count_equals_k() {
        for k in 1..=5u32 {
            let judge = Arc::new(SucceedsOnCall::new(k, &["finding"]));
            let report = append_loop(judge.clone(), 10).run("transcript").await.unwrap();
            assert_eq!(report.iterations, k, "k = {}", k);
            assert_eq!(judge.calls_made(), k);
        }
    }

    #[tokio::test]
    async fn test_immediate_success_single_call() {
        let judge = Arc::new(SucceedsOnCall::new(1, &["kept finding"]));
        let report = append_loop(judge.clone(), 10).run("transcript").await.unwrap();

        assert_eq!(report.iterations, 1);
        assert_eq!(judge.calls_made(), 1);
        // Findings come back unchanged
        assert_eq!(report.verdict.action_items().unwrap(), &["kept finding"]);
    }

    #[tokio::test]
    async fn test_never_success_times_out_at_cap() {
        let judge = Arc::new(SucceedsOnCall::new(u32::MAX, &["finding"]));
        let result = append_loop(judge.clone(), 10).run("transcript").await;

        assert!(matches!(
            result,
            Err(JudgrError::ConvergenceTimeout { iterations: 10 })
        ));
        assert_eq!(judge.calls_made(), 10);
    }

    #[tokio::test]
    async fn test_message_composition_fidelity() {
        let judge = Arc::new(SucceedsOnCall::new(3, &["prior finding one", "prior finding two"]));
        append_loop(judge.clone(), 10)
            .run("the transcript body")
            .await
            .unwrap();

        let captured = judge.captured.lock().unwrap();
        assert_eq!(captured.len(), 3);

        // First message: transcript only
        assert!(captured[0].0.contains("the transcript body"));
        assert!(!captured[0].0.contains("[eval]"));
        assert_eq!(captured[0].1, "seed");

        // Later messages carry the transcript and the prior findings verbatim
        for (message, instruction) in captured.iter().skip(1) {
            assert!(message.contains("the transcript body"));
            assert!(message.contains("\"prior finding one\""));
            assert!(message.contains("\"prior finding two\""));
            assert!(message.contains("[prompt]\nseed\n[/prompt]"));
            assert_eq!(instruction, "seed");
        }
    }

    #[tokio::test]
    async fn test_empty_findings_failure_stalls() {
        let judge = Arc::new(SucceedsOnCall::new(u32::MAX, &[]));
        let result = append_loop(judge.clone(), 20).run("transcript").await;

        // Stall threshold 3 trips before the iteration cap
        assert!(matches!(
            result,
            Err(JudgrError::ConvergenceStalled { iterations: 3 })
        ));
        assert_eq!(judge.calls_made(), 3);
    }

    /// Judge that alternates empty and non-empty failure verdicts.
    struct AlternatingJudge {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Judge for AlternatingJudge {
        async fn evaluate(&self, _message: &str, _instruction: &str) -> Result<Verdict> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let feedback = if call % 2 == 0 {
                Feedback::ActionItems(vec![])
            } else {
                Feedback::ActionItems(vec!["progress".to_string()])
            };
            Ok(Verdict {
                success: false,
                feedback,
            })
        }
    }

    #[tokio::test]
    async fn test_stall_counter_resets_on_progress() {
        let judge = Arc::new(AlternatingJudge {
            calls: AtomicU32::new(0),
        });
        let result = append_loop(judge, 8).run("transcript").await;

        // Stalls never accumulate to 3 in a row, so the cap is what trips
        assert!(matches!(
            result,
            Err(JudgrError::ConvergenceTimeout { iterations: 8 })
        ));
    }

    /// Judge for the rewrite variant: emits an improved instruction, then
    /// succeeds only once it sees that instruction come back.
    struct RewritingJudge {
        captured: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Judge for RewritingJudge {
        async fn evaluate(&self, _message: &str, instruction: &str) -> Result<Verdict> {
            self.captured.lock().unwrap().push(instruction.to_string());
            if instruction == "improved instruction" {
                Ok(Verdict {
                    success: true,
                    feedback: Feedback::ImprovedInstruction("improved instruction".to_string()),
                })
            } else {
                Ok(Verdict {
                    success: false,
                    feedback: Feedback::ImprovedInstruction("improved instruction".to_string()),
                })
            }
        }
    }

    #[tokio::test]
    async fn test_replace_instruction_feeds_back() {
        let judge = Arc::new(RewritingJudge {
            captured: Mutex::new(Vec::new()),
        });
        let convergence = ConvergenceLoop::new(
            judge.clone(),
            Arc::new(ReplaceInstruction::with_instruction("seed")),
        );

        let report = convergence.run("transcript").await.unwrap();
        assert_eq!(report.iterations, 2);

        let captured = judge.captured.lock().unwrap();
        assert_eq!(captured.as_slice(), &["seed", "improved instruction"]);
    }

    /// Judge that always errors.
    struct BrokenJudge;

    #[async_trait]
    impl Judge for BrokenJudge {
        async fn evaluate(&self, _message: &str, _instruction: &str) -> Result<Verdict> {
            Err(JudgrError::SchemaViolation("always broken".to_string()))
        }
    }

    #[tokio::test]
    async fn test_judge_error_propagates() {
        let result = append_loop(Arc::new(BrokenJudge), 10).run("transcript").await;
        assert!(matches!(result, Err(JudgrError::SchemaViolation(_))));
    }

    #[test]
    fn test_convergence_config_default() {
        let config = ConvergenceConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.stall_threshold, 3);
    }

    #[tokio::test]
    async fn test_verdict_shape_matches_strategy() {
        // Sanity: the two strategies declare the two verdict shapes
        assert_eq!(
            AppendFindings::with_instruction("s").shape(),
            VerdictShape::ActionItems
        );
        assert_eq!(
            ReplaceInstruction::with_instruction("s").shape(),
            VerdictShape::ImprovedInstruction
        );
    }
}
