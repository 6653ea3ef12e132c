//! Ollama Reasoning Service
//!
//! Local inference through `ollama-rs`. Ollama chat has no function calling
//! here, so the tool catalog is appended to the system prompt and tool
//! requests are read back from fenced `tool` blocks in the reply.

use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, MessageRole, request::ChatMessageRequest},
};

use chain_core::{
    error::{OrchestratorError, Result},
    message::{Message, Role},
    provider::{ReasoningService, TurnOutcome},
    tool::{ToolInvocationRequest, ToolSpec, render_catalog},
};

/// Ollama service configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            model: "llama3.2".into(),
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("OLLAMA_HOST").unwrap_or(defaults.host);
        let port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);
        let model = std::env::var("OLLAMA_MODEL").unwrap_or(defaults.model);

        Self { host, port, model }
    }
}

/// Ollama reasoning service
pub struct OllamaService {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaService {
    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Self {
        Self {
            client: Ollama::new(config.host.clone(), config.port),
            config,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(OllamaConfig::from_env())
    }

    /// Convert the conversation to Ollama messages, folding the catalog into
    /// the system prompt when tools are offered
    fn convert_messages(conversation: &[Message], tools: &[ToolSpec]) -> Vec<ChatMessage> {
        let mut converted: Vec<ChatMessage> = conversation
            .iter()
            .map(|m| match m.role {
                Role::System => ChatMessage::new(MessageRole::System, m.content.clone()),
                Role::User => ChatMessage::new(MessageRole::User, m.content.clone()),
                Role::Assistant => ChatMessage::new(MessageRole::Assistant, m.content.clone()),
                Role::ToolRequest => {
                    let request = ToolInvocationRequest::new(
                        m.tool_name.clone().unwrap_or_default(),
                        m.tool_arguments.clone().unwrap_or_default(),
                    );
                    let body = serde_json::to_string(&request).unwrap_or_default();
                    ChatMessage::new(MessageRole::Assistant, format!("```tool\n{}\n```", body))
                }
                // Tool output appears as user context
                Role::ToolResult => ChatMessage::new(
                    MessageRole::User,
                    format!(
                        "[Tool '{}' returned]\n{}",
                        m.tool_result_for.as_deref().unwrap_or("unknown"),
                        m.content
                    ),
                ),
            })
            .collect();

        if !tools.is_empty() {
            let catalog = render_catalog(tools);
            match converted.iter_mut().find(|m| matches!(m.role, MessageRole::System)) {
                Some(system) => {
                    system.content.push_str("\n\n");
                    system.content.push_str(&catalog);
                }
                None => converted.insert(0, ChatMessage::new(MessageRole::System, catalog)),
            }
        }

        converted
    }

    /// Interpret a reply; tool blocks only count while tools are offered
    fn interpret(content: String, tools: &[ToolSpec]) -> TurnOutcome {
        if !tools.is_empty() {
            if let Some(request) = parse_tool_request(&content) {
                return TurnOutcome::ContinueWith(request);
            }
        }
        TurnOutcome::Final(content)
    }
}

/// Extract a tool request from a ```tool block, falling back to inline JSON
/// carrying a `"tool"` key
fn parse_tool_request(content: &str) -> Option<ToolInvocationRequest> {
    let tool_start = "```tool";
    let tool_end = "```";

    let parsed = content.find(tool_start).and_then(|start_idx| {
        let after_marker = &content[start_idx + tool_start.len()..];
        let end_idx = after_marker.find(tool_end)?;
        serde_json::from_str::<ToolInvocationRequest>(after_marker[..end_idx].trim()).ok()
    });

    parsed.or_else(|| parse_inline_tool_request(content)).map(|mut request| {
        if request.id.is_none() {
            request.id = Some(uuid::Uuid::new_v4().to_string());
        }
        request
    })
}

fn parse_inline_tool_request(content: &str) -> Option<ToolInvocationRequest> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolInvocationRequest>(&content[start..=end]).ok()
}

#[async_trait]
impl ReasoningService for OllamaService {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn submit(&self, conversation: &[Message], tools: &[ToolSpec]) -> Result<TurnOutcome> {
        let request = ChatMessageRequest::new(
            self.config.model.clone(),
            Self::convert_messages(conversation, tools),
        );

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| OrchestratorError::Provider(e.to_string()))?;

        Ok(Self::interpret(response.message.content, tools))
    }
}
