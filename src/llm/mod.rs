//! LLM Client Layer - OpenAI API integration with structured outputs
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - OpenAiClient implementation

pub mod client;
pub mod openai;
pub mod types;

pub use client::{LlmClient, LlmError, MockLlmClient};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use types::{
    CompletionRequest, CompletionResponse, FinishReason, Message, ResponseSchema, Role, Usage,
};
