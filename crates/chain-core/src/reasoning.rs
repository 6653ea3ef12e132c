//! Orchestration Loop
//!
//! Alternates between the reasoning service and local tool executors until
//! the service answers without requesting a tool.
//!
//! ```text
//! AwaitingModel ──ContinueWith──▶ ToolRequested ──▶ Executing ──┐
//!      ▲                                                        │
//!      └────────────── append tool_result + anchor ◀────────────┘
//! AwaitingModel ──Final──▶ closing pass (no catalog) ──▶ Done
//! ```

use std::sync::Arc;

use tracing::Instrument;

use crate::error::{OrchestratorError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{ReasoningService, TurnOutcome};
use crate::tool::{Tool, ToolInvocationRequest, ToolRegistry};

/// Default cap on tool turns per request
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Orchestrator configuration
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// System instructions placed at the head of every conversation
    pub system_prompt: String,

    /// Maximum tool turns per request; `None` disables the cap
    pub max_turns: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_turns: Some(DEFAULT_MAX_TURNS),
        }
    }
}

impl OrchestratorConfig {
    /// Read overrides from the environment.
    ///
    /// `CHAIN_MAX_TURNS` sets the turn cap; `0` disables it.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("CHAIN_MAX_TURNS") {
            match parse_max_turns(&raw) {
                Some(max_turns) => config.max_turns = max_turns,
                None => tracing::warn!(value = %raw, "Ignoring invalid CHAIN_MAX_TURNS"),
            }
        }

        config
    }
}

/// Parse a turn cap: `0` means no cap, garbage yields `None`
pub fn parse_max_turns(raw: &str) -> Option<Option<usize>> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Some(None),
        Ok(n) => Some(Some(n)),
        Err(_) => None,
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. \
Use the available tools when a request needs a computation or live data, \
one tool at a time, then answer concisely.";

/// Drives one user request to a final answer
pub struct Orchestrator {
    service: Arc<dyn ReasoningService>,
    tools: Arc<ToolRegistry>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        service: Arc<dyn ReasoningService>,
        tools: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            service,
            tools,
            config,
        }
    }

    /// Answer a single user request in a fresh conversation
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut conversation = Conversation::for_request(&self.config.system_prompt, question);
        self.run(&mut conversation).await
    }

    /// Run the loop over a conversation that already holds the system
    /// instructions and the user's request.
    ///
    /// On a fatal error the conversation keeps every message appended by
    /// completed turns and nothing from the failing one.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<String> {
        let span = tracing::info_span!(
            "request",
            conversation = %conversation.id(),
            service = self.service.name(),
        );
        self.drive(conversation).instrument(span).await
    }

    async fn drive(&self, conversation: &mut Conversation) -> Result<String> {
        let mut turns = 0usize;
        let mut outcome = self
            .service
            .submit(conversation.messages(), self.tools.all_specs())
            .await?;

        while let TurnOutcome::ContinueWith(request) = outcome {
            if let Some(max) = self.config.max_turns {
                if turns >= max {
                    tracing::error!(max, tool = %request.tool_name, "Turn budget exhausted");
                    return Err(OrchestratorError::MaxTurns(max));
                }
            }
            turns += 1;

            self.execute_turn(conversation, &request).await?;

            outcome = self
                .service
                .submit(conversation.messages(), self.tools.all_specs())
                .await?;
        }

        tracing::debug!(turns, "Reasoning service finished, requesting closing answer");

        match self.service.submit(conversation.messages(), &[]).await? {
            TurnOutcome::Final(text) => Ok(text),
            TurnOutcome::ContinueWith(request) => Err(OrchestratorError::MalformedResponse(format!(
                "tool '{}' requested when no tools were offered",
                request.tool_name
            ))),
        }
    }

    /// Execute one requested tool and append its result plus the anchor message
    async fn execute_turn(
        &self,
        conversation: &mut Conversation,
        request: &ToolInvocationRequest,
    ) -> Result<()> {
        tracing::debug!(tool = %request.tool_name, "Executing tool");

        let result = self.tools.execute(request).await.inspect_err(|e| {
            tracing::error!(error = %e, "Reasoning service requested an unregistered tool");
        })?;

        let text = result.outcome.to_text();
        tracing::info!(success = result.outcome.is_success(), "After {}: {}", result.tool_name, text);

        conversation.push(Message::tool_result(&result.tool_name, &text));
        conversation.push(Message::assistant(anchor_message(&text)));
        Ok(())
    }
}

/// Synthetic assistant message restating a tool result
pub fn anchor_message(result_text: &str) -> String {
    format!(
        "I got the result: {}. Let me continue with the next operation if needed.",
        result_text
    )
}

/// Builder for Orchestrator configuration
pub struct OrchestratorBuilder {
    service: Option<Arc<dyn ReasoningService>>,
    tools: ToolRegistry,
    config: OrchestratorConfig,
    registration_error: Option<OrchestratorError>,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            service: None,
            tools: ToolRegistry::new(),
            config: OrchestratorConfig::default(),
            registration_error: None,
        }
    }

    pub fn service(mut self, service: Arc<dyn ReasoningService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        if let Err(e) = self.tools.register(tool) {
            self.registration_error.get_or_insert(e);
        }
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn max_turns(mut self, max: Option<usize>) -> Self {
        self.config.max_turns = max;
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        if let Some(err) = self.registration_error {
            return Err(err);
        }

        let service = self
            .service
            .ok_or_else(|| OrchestratorError::Config("Reasoning service is required".into()))?;

        Ok(Orchestrator::new(service, Arc::new(self.tools), self.config))
    }
}
