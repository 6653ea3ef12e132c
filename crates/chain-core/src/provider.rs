//! Reasoning Service Strategy Pattern
//!
//! Defines the interface the orchestration loop uses to talk to a language
//! model (OpenAI-compatible endpoints, Ollama, test stubs) without knowing
//! its wire format.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chain_core::provider::{ReasoningService, TurnOutcome};
//!
//! let outcome = service.submit(conversation.messages(), registry.all_specs()).await?;
//! match outcome {
//!     TurnOutcome::ContinueWith(request) => { /* dispatch tool */ }
//!     TurnOutcome::Final(text) => { /* done */ }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolInvocationRequest, ToolSpec};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gpt-4o-mini", "llama3.2")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl GenerationOptions {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// What the reasoning service decided for one turn
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    /// Run this tool and resubmit the conversation
    ContinueWith(ToolInvocationRequest),
    /// Terminal natural-language answer
    Final(String),
}

impl TurnOutcome {
    pub fn is_final(&self) -> bool {
        matches!(self, TurnOutcome::Final(_))
    }
}

/// Strategy trait for reasoning services
///
/// Every call receives the full conversation; implementations keep no state
/// between calls and return at most one tool request per call. An empty
/// `tools` slice means no catalog is offered and a final answer is expected.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Human-readable service name for logs
    fn name(&self) -> &str;

    /// Check if the service is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Submit the conversation and tool catalog, receive the next outcome
    async fn submit(&self, conversation: &[Message], tools: &[ToolSpec]) -> Result<TurnOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.model, "gpt-4o-mini");
        assert!(opts.temperature.is_none());
        assert_eq!(GenerationOptions::for_model("llama3.2").model, "llama3.2");
    }

    #[test]
    fn test_turn_outcome_is_final() {
        assert!(TurnOutcome::Final("done".into()).is_final());
        let request = ToolInvocationRequest::new("calculate", Default::default());
        assert!(!TurnOutcome::ContinueWith(request).is_final());
    }
}
