//! Error types for ds-llm

use thiserror::Error;

/// Generative-text error type
#[derive(Error, Debug)]
pub enum LlmError {
    /// Missing or invalid client configuration
    #[error("Generation client config error: {0}")]
    Config(String),

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Generation request failed: {0}")]
    Http(String),

    /// The endpoint returned a non-success status
    #[error("Generation API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The endpoint returned a body the client could not interpret
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Result type alias for LlmError
pub type LlmResult<T> = Result<T, LlmError>;
