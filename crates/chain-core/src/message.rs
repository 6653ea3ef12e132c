//! Conversation Messages
//!
//! Role-tagged messages and the append-only conversation log that carries
//! all context between reasoning turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tool::Arguments;

/// Role of a message sender
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System prompt/instructions
    System,
    /// User input
    User,
    /// Assistant (LLM) response or synthetic anchor
    Assistant,
    /// A tool invocation requested by the assistant
    ToolRequest,
    /// Tool output relayed back to the reasoning service
    ToolResult,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::ToolRequest => write!(f, "tool_request"),
            Role::ToolResult => write!(f, "tool_result"),
        }
    }
}

/// A single message in a conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Text content
    pub content: String,

    /// Tool requested (for `ToolRequest` messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Arguments of the requested tool (for `ToolRequest` messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_arguments: Option<Arguments>,

    /// Tool whose output this is (for `ToolResult` messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result_for: Option<String>,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_name: None,
            tool_arguments: None,
            tool_result_for: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a tool request message
    pub fn tool_request(tool_name: impl Into<String>, arguments: Arguments) -> Self {
        let mut msg = Self::new(Role::ToolRequest, "");
        msg.tool_name = Some(tool_name.into());
        msg.tool_arguments = Some(arguments);
        msg
    }

    /// Create a tool result message
    pub fn tool_result(tool_name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::ToolResult, content);
        msg.tool_result_for = Some(tool_name.into());
        msg
    }
}

/// Append-only conversation log.
///
/// Messages are never edited, removed or reordered once pushed; the order is
/// the reasoning service's only memory of the request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    id: Uuid,
    messages: Vec<Message>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
        }
    }

    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        let mut conv = Self::new();
        conv.push(Message::system(prompt));
        conv
    }

    /// Initial state of a request: system instructions followed by the user's text
    pub fn for_request(system_prompt: impl Into<String>, user_input: impl Into<String>) -> Self {
        let mut conv = Self::with_system_prompt(system_prompt);
        conv.push(Message::user(user_input));
        conv
    }

    /// Request-scoped identifier, used for log correlation
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Get all messages
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Get the last message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
