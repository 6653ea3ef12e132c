//! # chain-runtime
//!
//! Reasoning service adapters for the chain orchestrator.
//!
//! ## Services
//!
//! - **OpenAI** (default): any OpenAI-compatible chat-completions endpoint,
//!   using native function calling
//! - **Ollama** (feature `ollama`): local inference; the tool catalog is
//!   injected into the system prompt and tool requests are read back from
//!   fenced `tool` blocks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chain_runtime::openai::OpenAiService;
//!
//! let service = OpenAiService::from_env()?;
//! let orchestrator = OrchestratorBuilder::new()
//!     .service(Arc::new(service))
//!     .build()?;
//! ```

pub mod openai;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::OllamaService;
pub use openai::OpenAiService;

// Re-export core types for convenience
pub use chain_core::{
    Message, Orchestrator, OrchestratorError, ReasoningService, Result, Role, ToolRegistry,
    TurnOutcome,
};
