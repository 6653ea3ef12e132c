//! OpenAI-compatible Reasoning Service
//!
//! Chat completions with function calling. Tool results travel as
//! `function` role messages named after the tool that produced them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chain_core::{
    error::{OrchestratorError, Result},
    message::{Message, Role},
    provider::{GenerationOptions, ReasoningService, TurnOutcome},
    tool::{Arguments, ToolInvocationRequest, ToolSpec},
};

/// OpenAI service configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: String,

    /// API base URL (no trailing slash)
    pub base_url: String,

    /// Generation options
    pub generation: GenerationOptions,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            generation: GenerationOptions::default(),
            timeout_secs: 120,
        }
    }

    /// Read `OPENAI_API_KEY` (required), `OPENAI_BASE_URL` and `OPENAI_MODEL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OrchestratorError::Config("OPENAI_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            config.generation.model = model;
        }
        Ok(config)
    }
}

/// OpenAI-compatible reasoning service
pub struct OpenAiService {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiService {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OrchestratorError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    fn build_request<'a>(&'a self, conversation: &[Message], tools: &'a [ToolSpec]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.generation.model,
            messages: encode_messages(conversation),
            functions: tools
                .iter()
                .map(|spec| WireFunction {
                    name: &spec.name,
                    description: &spec.description,
                    parameters: spec.parameters_json_schema(),
                })
                .collect(),
            temperature: self.config.generation.temperature,
            max_tokens: self.config.generation.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    functions: Vec<WireFunction<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

fn encode_messages(conversation: &[Message]) -> Vec<WireMessage> {
    conversation
        .iter()
        .map(|m| match m.role {
            Role::System | Role::User | Role::Assistant => WireMessage {
                role: m.role.to_string(),
                content: Some(m.content.clone()),
                name: None,
                function_call: None,
            },
            Role::ToolRequest => WireMessage {
                role: "assistant".into(),
                content: None,
                name: None,
                function_call: Some(WireFunctionCall {
                    name: m.tool_name.clone().unwrap_or_default(),
                    arguments: Value::Object(m.tool_arguments.clone().unwrap_or_default()).to_string(),
                }),
            },
            Role::ToolResult => WireMessage {
                role: "function".into(),
                content: Some(m.content.clone()),
                name: m.tool_result_for.clone(),
                function_call: None,
            },
        })
        .collect()
}

fn decode_response(response: ChatResponse) -> Result<TurnOutcome> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| OrchestratorError::MalformedResponse("response has no choices".into()))?;

    if let Some(call) = choice.message.function_call {
        let arguments = parse_arguments(&call)?;
        let request = ToolInvocationRequest::new(call.name, arguments)
            .with_id(uuid::Uuid::new_v4().to_string());
        return Ok(TurnOutcome::ContinueWith(request));
    }

    if choice.finish_reason.as_deref() == Some("function_call") {
        return Err(OrchestratorError::MalformedResponse(
            "finish_reason is function_call but no call was returned".into(),
        ));
    }

    Ok(TurnOutcome::Final(choice.message.content.unwrap_or_default()))
}

fn parse_arguments(call: &WireFunctionCall) -> Result<Arguments> {
    if call.arguments.trim().is_empty() {
        return Ok(Arguments::new());
    }

    match serde_json::from_str::<Value>(&call.arguments) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(OrchestratorError::MalformedResponse(format!(
            "arguments for '{}' are not an object: {}",
            call.name, other
        ))),
        Err(e) => Err(OrchestratorError::MalformedResponse(format!(
            "arguments for '{}' are not valid JSON: {}",
            call.name, e
        ))),
    }
}

fn status_error(status: StatusCode, body: String) -> OrchestratorError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => OrchestratorError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => OrchestratorError::RateLimited(body),
        s if s.is_server_error() => OrchestratorError::ProviderUnavailable(format!("{}: {}", s, body)),
        s => OrchestratorError::Provider(format!("{}: {}", s, body)),
    }
}

fn transport_error(err: reqwest::Error) -> OrchestratorError {
    if err.is_timeout() || err.is_connect() {
        OrchestratorError::ProviderUnavailable(err.to_string())
    } else {
        OrchestratorError::Provider(err.to_string())
    }
}

#[async_trait]
impl ReasoningService for OpenAiService {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .http
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .send()
            .await;

        match response {
            Ok(r) => Ok(r.status().is_success()),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn submit(&self, conversation: &[Message], tools: &[ToolSpec]) -> Result<TurnOutcome> {
        let request = self.build_request(conversation, tools);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "OpenAI request failed");
            return Err(status_error(status, body));
        }

        let body = response.text().await.map_err(transport_error)?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| OrchestratorError::MalformedResponse(e.to_string()))?;

        decode_response(parsed)
    }
}
