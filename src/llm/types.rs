//! Provider-agnostic conversation model
//!
//! A conversation is an ordered list of messages, each holding an ordered list
//! of typed content blocks. The serde shape (`type: text|tool_use|tool_result`)
//! doubles as the persisted snapshot format.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One typed unit of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },

    /// A tool call requested by the model. `id` is provider-assigned and opaque.
    #[serde(rename = "tool_use")]
    ToolInvocation {
        id: String,
        name: String,
        #[serde(rename = "input", default = "empty_object")]
        arguments: Value,
    },

    ToolResult {
        #[serde(rename = "tool_use_id")]
        invocation_id: String,
        content: String,
    },
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_invocation(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self::ToolInvocation {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    pub fn tool_result(invocation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            invocation_id: invocation_id.into(),
            content: content.into(),
        }
    }

    pub fn is_tool_invocation(&self) -> bool {
        matches!(self, Self::ToolInvocation { .. })
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(deserialize_with = "content_from_text_or_blocks")]
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message holding a single text block
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Create an assistant message from an already-ordered block sequence
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Create the user message that carries one round's tool results
    pub fn tool_results(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// Concatenated text of all text blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tool invocations in the order they appear
    pub fn tool_invocations(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.content.iter().filter_map(|b| match b {
            ContentBlock::ToolInvocation { id, name, arguments } => Some((id.as_str(), name.as_str(), arguments)),
            _ => None,
        })
    }
}

/// Older snapshots store user turns as a bare string.
fn content_from_text_or_blocks<'de, D>(deserializer: D) -> std::result::Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MessageContent {
        Text(String),
        Blocks(Vec<ContentBlock>),
    }

    Ok(match MessageContent::deserialize(deserializer)? {
        MessageContent::Text(text) if text.is_empty() => Vec::new(),
        MessageContent::Text(text) => vec![ContentBlock::Text { text }],
        MessageContent::Blocks(blocks) => blocks,
    })
}

/// Ordered, append-only message history for one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. Messages with no content are dropped; returns whether
    /// the message was stored.
    pub fn push(&mut self, message: Message) -> bool {
        if message.content.is_empty() {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Replace the whole history, e.g. after loading a snapshot
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages.into_iter().filter(|m| !m.content.is_empty()).collect();
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        let mut conversation = Self::new();
        conversation.replace(messages);
        conversation
    }
}

/// Tool definition offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
