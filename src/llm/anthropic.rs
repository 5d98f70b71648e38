//! Anthropic Messages API dialect
//!
//! Tool invocations stay inline in assistant messages; tool results travel as
//! `tool_result` items in user-role content. Because [`ContentBlock`]'s serde
//! shape is exactly Anthropic's block shape, messages serialize directly.

use log::debug;
use serde_json::{Value, json};

use super::codec::{DecodeError, RequestOptions};
use super::types::{ContentBlock, Conversation, Role, ToolDefinition};

/// Anthropic tool schema: `{name, description, input_schema}`
pub fn tool_schema(tool: &ToolDefinition) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": tool.input_schema,
    })
}

/// Build the request body for the Anthropic API
pub fn encode_request(
    conversation: &Conversation,
    model: &str,
    tool_schemas: &[Value],
    options: &RequestOptions,
) -> Value {
    let messages: Vec<Value> = conversation
        .messages()
        .iter()
        .map(|m| {
            json!({
                "role": match m.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                "content": m.content,
            })
        })
        .collect();

    let mut body = json!({
        "model": model,
        "max_tokens": options.max_tokens,
        "messages": messages,
    });

    if !options.system_prompt.is_empty() {
        body["system"] = json!(options.system_prompt);
    }

    if !tool_schemas.is_empty() {
        body["tools"] = json!(tool_schemas);
    }

    body
}

/// Map a response's `content` array onto content blocks
pub fn decode_response(body: &Value) -> Result<Vec<ContentBlock>, DecodeError> {
    let blocks = match body.get("content") {
        Some(Value::Array(blocks)) => blocks,
        Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            return Err(DecodeError::Shape(format!("content is not an array: {}", other)));
        }
        None => return Err(DecodeError::Shape("response has no content field".to_string())),
    };

    let mut decoded = Vec::with_capacity(blocks.len());
    for block in blocks {
        if let Some(block) = decode_block(block)? {
            decoded.push(block);
        }
    }
    Ok(decoded)
}

/// Decode one content block. Block types we do not model (e.g. thinking) are skipped.
fn decode_block(block: &Value) -> Result<Option<ContentBlock>, DecodeError> {
    let field = |name: &str| {
        block
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DecodeError::Shape(format!("content block missing '{}': {}", name, block)))
    };

    match block.get("type").and_then(Value::as_str) {
        Some("text") => Ok(Some(ContentBlock::Text { text: field("text")? })),
        Some("tool_use") => Ok(Some(ContentBlock::ToolInvocation {
            id: field("id")?,
            name: field("name")?,
            arguments: block
                .get("input")
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
        })),
        Some("tool_result") => Ok(Some(ContentBlock::ToolResult {
            invocation_id: field("tool_use_id")?,
            content: field("content")?,
        })),
        other => {
            debug!("Skipping unsupported content block type: {:?}", other);
            Ok(None)
        }
    }
}
