//! judgr - a convergence-seeking evaluation harness
//!
//! judgr repeatedly asks an LLM Judge to extract action items from a chatbot
//! transcript, then feeds each verdict back to the Judge until it declares the
//! evaluation complete, bounded by an iteration cap and aggregated across a
//! directory of transcripts.

pub mod batch;
pub mod error;
pub mod judge;
pub mod llm;
pub mod prompts;
pub mod runner;
pub mod tracking;
pub mod transcripts;

pub use error::{JudgrError, Result};
