//! Tool System
//!
//! Named, schema-described capabilities the reasoning service can invoke.
//! Tools are registered once at startup and dispatched by the orchestration loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{OrchestratorError, Result};

/// Tool arguments: parameter name to JSON value
pub type Arguments = serde_json::Map<String, Value>;

/// Tool invocation requested by the reasoning service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    /// Tool identifier
    #[serde(rename = "tool", alias = "name")]
    pub tool_name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: Arguments,

    /// Optional call ID for tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ToolInvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Tagged outcome of a tool execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Number, mapping, sequence or text produced by the tool
    Success(Value),
    /// Human-readable reason the tool could not produce a value
    Failure(String),
}

impl ToolOutcome {
    pub fn success(value: impl Into<Value>) -> Self {
        ToolOutcome::Success(value.into())
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        ToolOutcome::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// Text relayed to the reasoning service.
    ///
    /// Strings are passed through verbatim, other values as compact JSON,
    /// failures as their reason.
    pub fn to_text(&self) -> String {
        match self {
            ToolOutcome::Success(Value::String(s)) => s.clone(),
            ToolOutcome::Success(value) => value.to_string(),
            ToolOutcome::Failure(reason) => reason.clone(),
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub tool_name: String,

    /// Call ID (if provided in request)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Success payload or failure descriptor
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn new(tool_name: impl Into<String>, outcome: ToolOutcome) -> Self {
        Self {
            tool_name: tool_name.into(),
            id: None,
            outcome,
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, integer, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

impl ParameterSchema {
    /// Check a supplied value against the declared primitive type
    fn accepts(&self, value: &Value) -> bool {
        match self.param_type.as_str() {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        }
    }
}

/// Tool definition presented to the reasoning service every turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,
}

impl ToolSpec {
    /// JSON Schema object describing the parameters, as used by function-calling APIs
    pub fn parameters_json_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        for param in &self.parameters {
            let mut prop = json!({
                "type": param.param_type,
                "description": param.description,
            });
            if let Some(default) = &param.default {
                prop["default"] = default.clone();
            }
            if let Some(values) = &param.enum_values {
                prop["enum"] = Value::Array(values.clone());
            }
            properties.insert(param.name.clone(), prop);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validate arguments before execution
    pub fn validate(&self, arguments: &Arguments) -> std::result::Result<(), String> {
        for param in &self.parameters {
            match arguments.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(format!("Missing required parameter: {}", param.name));
                }
                Some(value) if !value.is_null() && !param.accepts(value) => {
                    return Err(format!(
                        "Parameter '{}' must be of type {}",
                        param.name, param.param_type
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Tool executor - implement to add new capabilities
///
/// Executors never fail at the Rust level: any problem is reported as
/// [`ToolOutcome::Failure`] so the reasoning service can react to it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's spec for the reasoning service
    fn spec(&self) -> ToolSpec;

    /// Execute the tool with validated arguments
    async fn execute(&self, arguments: &Arguments) -> ToolOutcome;
}

/// Ordered registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
    executors: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let spec = tool.spec();
        if self.index.contains_key(&spec.name) {
            return Err(OrchestratorError::DuplicateTool(spec.name));
        }

        self.index.insert(spec.name.clone(), self.specs.len());
        self.specs.push(spec);
        self.executors.push(tool);
        Ok(())
    }

    /// Look up a tool spec by name
    pub fn lookup(&self, name: &str) -> Result<&ToolSpec> {
        self.index
            .get(name)
            .map(|&idx| &self.specs[idx])
            .ok_or_else(|| OrchestratorError::ToolNotFound(name.to_string()))
    }

    /// Get a tool executor by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&idx| self.executors[idx].clone())
    }

    /// All specs, in registration order
    pub fn all_specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Execute a tool invocation.
    ///
    /// Only an unknown tool name is an error; invalid arguments come back as
    /// a failed [`ToolResult`].
    pub async fn execute(&self, request: &ToolInvocationRequest) -> Result<ToolResult> {
        let spec = self.lookup(&request.tool_name)?;
        let tool = self
            .get(&request.tool_name)
            .ok_or_else(|| OrchestratorError::ToolNotFound(request.tool_name.clone()))?;

        let outcome = match spec.validate(&request.arguments) {
            Ok(()) => tool.execute(&request.arguments).await,
            Err(reason) => ToolOutcome::failure(format!("Error: {}", reason)),
        };

        Ok(ToolResult::new(&request.tool_name, outcome).with_id(request.id.clone()))
    }

    /// Get tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Markdown catalog for providers without native function calling
pub fn render_catalog(specs: &[ToolSpec]) -> String {
    let mut prompt = String::from("## Available Tools\n\n");
    prompt.push_str("You can use the following tools by responding with a JSON block:\n\n");
    prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");
    prompt.push_str("Request one tool at a time.\n\n");

    for spec in specs {
        prompt.push_str(&format!("### {}\n", spec.name));
        prompt.push_str(&format!("{}\n", spec.description));

        if !spec.parameters.is_empty() {
            prompt.push_str("**Parameters:**\n");
            for param in &spec.parameters {
                let required = if param.required { " (required)" } else { "" };
                prompt.push_str(&format!(
                    "- `{}` ({}){}: {}\n",
                    param.name, param.param_type, required, param.description
                ));
            }
        }
        prompt.push('\n');
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "echo".into(),
                description: "Echo the input back".into(),
                parameters: vec![
                    ParameterSchema {
                        name: "text".into(),
                        param_type: "string".into(),
                        description: "Text to echo".into(),
                        required: true,
                        default: None,
                        enum_values: None,
                    },
                    ParameterSchema {
                        name: "times".into(),
                        param_type: "integer".into(),
                        description: "Repetitions".into(),
                        required: false,
                        default: Some(json!(1)),
                        enum_values: None,
                    },
                ],
                category: None,
            }
        }

        async fn execute(&self, arguments: &Arguments) -> ToolOutcome {
            let text = arguments.get("text").and_then(|v| v.as_str()).unwrap_or_default();
            let times = arguments.get("times").and_then(|v| v.as_u64()).unwrap_or(1) as usize;
            ToolOutcome::success(text.repeat(times))
        }
    }

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: self.0.into(),
                description: String::new(),
                parameters: Vec::new(),
                category: None,
            }
        }

        async fn execute(&self, _arguments: &Arguments) -> ToolOutcome {
            ToolOutcome::success(Value::Null)
        }
    }

    fn args(value: Value) -> Arguments {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_registry_lookup_and_order() {
        let mut registry = ToolRegistry::new();
        registry.register(NamedTool("zeta")).unwrap();
        registry.register(NamedTool("alpha")).unwrap();
        registry.register(EchoTool).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["zeta", "alpha", "echo"]);
        assert_eq!(registry.all_specs()[2].name, "echo");
        assert!(registry.lookup("alpha").is_ok());
        assert!(matches!(
            registry.lookup("unknown"),
            Err(OrchestratorError::ToolNotFound(name)) if name == "unknown"
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(NamedTool("same")).unwrap();
        let err = registry.register(NamedTool("same")).unwrap_err();
        assert!(matches!(err, OrchestratorError::DuplicateTool(_)));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();

        let request = ToolInvocationRequest::new("echo", args(json!({"text": "ab", "times": 2})))
            .with_id("call-1");
        let result = registry.execute(&request).await.unwrap();

        assert_eq!(result.tool_name, "echo");
        assert_eq!(result.id.as_deref(), Some("call-1"));
        assert_eq!(result.outcome, ToolOutcome::success("abab"));
    }

    #[tokio::test]
    async fn test_execute_missing_argument_is_failure() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();

        let request = ToolInvocationRequest::new("echo", Arguments::new());
        let result = registry.execute(&request).await.unwrap();

        assert_eq!(
            result.outcome,
            ToolOutcome::failure("Error: Missing required parameter: text")
        );
    }

    #[tokio::test]
    async fn test_execute_wrong_type_is_failure() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();

        let request = ToolInvocationRequest::new("echo", args(json!({"text": "a", "times": "two"})));
        let result = registry.execute(&request).await.unwrap();
        assert!(!result.outcome.is_success());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let request = ToolInvocationRequest::new("nope", Arguments::new());
        assert!(matches!(
            registry.execute(&request).await,
            Err(OrchestratorError::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_parameters_json_schema() {
        let schema = EchoTool.spec().parameters_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["text"]["type"], "string");
        assert_eq!(schema["properties"]["times"]["default"], 1);
        assert_eq!(schema["required"], json!(["text"]));
    }

    #[test]
    fn test_outcome_text() {
        assert_eq!(ToolOutcome::success(4).to_text(), "4");
        assert_eq!(ToolOutcome::success("plain").to_text(), "plain");
        assert_eq!(
            ToolOutcome::success(json!({"symbol": "AAPL"})).to_text(),
            r#"{"symbol":"AAPL"}"#
        );
        assert_eq!(ToolOutcome::failure("Error: boom").to_text(), "Error: boom");
    }

    #[test]
    fn test_request_parses_fenced_tool_format() {
        let request: ToolInvocationRequest =
            serde_json::from_str(r#"{"tool": "calculate", "arguments": {"expression": "2 + 2"}}"#)
                .unwrap();
        assert_eq!(request.tool_name, "calculate");
        assert_eq!(request.arguments["expression"], "2 + 2");
        assert!(request.id.is_none());
    }

    #[test]
    fn test_render_catalog_lists_parameters() {
        let section = render_catalog(&[EchoTool.spec()]);
        assert!(section.contains("### echo"));
        assert!(section.contains("- `text` (string) (required): Text to echo"));
        assert!(section.contains("- `times` (integer): Repetitions"));
    }
}
