//! Error types for judgr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in judgr
#[derive(Debug, Error)]
pub enum JudgrError {
    /// Missing credential or unusable configuration; fatal at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Judge response did not match the expected verdict shape
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Convergence loop exceeded the iteration cap without success
    #[error("No convergence after {iterations} iterations")]
    ConvergenceTimeout { iterations: u32 },

    /// Judge kept failing the verdict while offering no new findings
    #[error("Evaluation stalled after {iterations} iterations")]
    ConvergenceStalled { iterations: u32 },

    /// Transcript file could not be read or decoded
    #[error("Transcript read error: {0}")]
    TranscriptRead(String),

    /// Judge collaborator unreachable after bounded retries
    #[error("Judge unavailable: {0}")]
    JudgeUnavailable(String),

    /// Observability sink error
    #[error("Tracking error: {0}")]
    Tracking(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl JudgrError {
    /// Errors that abort the whole run rather than a single transcript.
    pub fn is_fatal(&self) -> bool {
        matches!(self, JudgrError::Configuration(_))
    }
}

/// Result type alias for judgr operations
pub type Result<T> = std::result::Result<T, JudgrError>;
