//! # chain-core
//!
//! Tool-augmented dialogue orchestration: a reasoning service decides, turn by
//! turn, whether it needs a tool; local executors run the tool; the loop threads
//! every result back through an append-only conversation.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Orchestrator                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │ Conversation │  │    Tool      │  │  ReasoningService  │  │
//! │  │   (log)      │──│   Registry   │──│    (Strategy)      │  │
//! │  └──────────────┘  └──────────────┘  └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `ReasoningService` trait enables swapping between OpenAI-compatible
//! endpoints, Ollama, or a scripted stub without changing the loop.

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod tool;

pub use error::{OrchestratorError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{GenerationOptions, ReasoningService, TurnOutcome};
pub use reasoning::{Orchestrator, OrchestratorBuilder, OrchestratorConfig};
pub use tool::{
    Arguments, ParameterSchema, Tool, ToolInvocationRequest, ToolOutcome, ToolRegistry,
    ToolResult, ToolSpec,
};
