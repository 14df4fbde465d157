//! Runner module - the per-transcript convergence loop and its strategies.

pub mod convergence;
pub mod strategy;

pub use convergence::{ConvergenceConfig, ConvergenceLoop, LoopReport};
pub use strategy::{AppendFindings, FeedbackStrategy, ReplaceInstruction};
