//! Feedback-composition strategies.
//!
//! The convergence loop is one state machine; what differs between the plain
//! re-evaluation run and the prompt-rewriting run is only the verdict shape
//! and which part of the prior verdict feeds back. Each variant is a
//! FeedbackStrategy implementation rather than a duplicated loop.

use crate::judge::{Feedback, Verdict, VerdictShape};
use crate::prompts;

/// How the next Judge message and instruction are derived from the prior verdict.
pub trait FeedbackStrategy: Send + Sync {
    /// Verdict shape the Judge must return under this strategy.
    fn shape(&self) -> VerdictShape;

    /// Initial behavioral directive, before any feedback is incorporated.
    fn seed_instruction(&self) -> &str;

    /// Message for the first Judge call: the transcript alone.
    fn first_message(&self, transcript: &str) -> String {
        format!("[dialog]\n{}\n[/dialog]\n", transcript)
    }

    /// Message for later calls: transcript, current instruction, and the
    /// prior verdict's feedback rendered as text.
    fn compose(&self, transcript: &str, instruction: &str, prior: &Verdict) -> String {
        format!(
            "[dialog]\n{}\n[/dialog]\n\n[prompt]\n{}\n[/prompt]\n\n[eval]\n{}\n[/eval]\n",
            transcript,
            instruction,
            prior.feedback.render()
        )
    }

    /// Instruction for the next Judge call.
    fn next_instruction(&self, current: &str, verdict: &Verdict) -> String;
}

/// Plain re-evaluation: findings are appended into the message, the
/// instruction stays fixed for the whole loop.
pub struct AppendFindings {
    instruction: String,
}

impl AppendFindings {
    pub fn new() -> Self {
        Self {
            instruction: prompts::ITERATIVE_PROMPT.to_string(),
        }
    }

    pub fn with_instruction(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }
}

impl Default for AppendFindings {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackStrategy for AppendFindings {
    fn shape(&self) -> VerdictShape {
        VerdictShape::ActionItems
    }

    fn seed_instruction(&self) -> &str {
        &self.instruction
    }

    fn next_instruction(&self, current: &str, _verdict: &Verdict) -> String {
        current.to_string()
    }
}

/// Prompt-rewriting variant: the Judge's improved instruction replaces the
/// instruction for the next call.
pub struct ReplaceInstruction {
    instruction: String,
}

impl ReplaceInstruction {
    pub fn new() -> Self {
        Self {
            instruction: prompts::REWRITE_PROMPT.to_string(),
        }
    }

    pub fn with_instruction(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }
}

impl Default for ReplaceInstruction {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackStrategy for ReplaceInstruction {
    fn shape(&self) -> VerdictShape {
        VerdictShape::ImprovedInstruction
    }

    fn seed_instruction(&self) -> &str {
        &self.instruction
    }

    fn next_instruction(&self, current: &str, verdict: &Verdict) -> String {
        match &verdict.feedback {
            Feedback::ImprovedInstruction(text) if !text.trim().is_empty() => text.clone(),
            _ => current.to_string(),
        }
    }
}
