//! Error Types

use thiserror::Error;

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Fatal errors for a single request.
///
/// Tool-level failures are not represented here: executors report them as
/// [`ToolOutcome::Failure`](crate::tool::ToolOutcome) and the loop relays them
/// to the reasoning service as ordinary result text.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Reasoning service returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Reasoning service unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Reasoning service response could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Requested tool is not in the registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Two tools registered under the same name
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Turn budget exhausted
    #[error("Maximum turns ({0}) exceeded")]
    MaxTurns(usize),

    /// Rate limited by the reasoning service
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl OrchestratorError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrchestratorError::ProviderUnavailable(_) | OrchestratorError::RateLimited(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            OrchestratorError::Provider(msg) => format!("The AI service encountered an error: {}", msg),
            OrchestratorError::ProviderUnavailable(_) => "The AI service is currently unavailable. Please try again.".into(),
            OrchestratorError::MalformedResponse(_) => "The AI service returned a response that could not be understood.".into(),
            OrchestratorError::ToolNotFound(name) => format!("The tool '{}' is not available.", name),
            OrchestratorError::MaxTurns(_) => "The request took too many steps to process. Please try a simpler query.".into(),
            OrchestratorError::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            OrchestratorError::Auth(_) => "Authentication failed. Please check your credentials.".into(),
            OrchestratorError::Config(msg) | OrchestratorError::DuplicateTool(msg) => {
                format!("The assistant is misconfigured: {}", msg)
            }
        }
    }
}
