//! Error Types for Market Tools
//!
//! These never cross the orchestrator boundary: each executor turns them into
//! a failure descriptor for the reasoning service.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Rate limited by {0}")]
    RateLimited(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ToolError::RateLimited(_))
    }
}
