//! OpenAI-compatible chat completions dialect
//!
//! The system prompt is its own leading message, tool invocations become
//! `tool_calls` whose `arguments` is a JSON *string*, and every tool result is
//! a separate `role: tool` message keyed by invocation id.

use serde_json::{Value, json};

use super::codec::{DecodeError, RequestOptions, parse_arguments};
use super::types::{ContentBlock, Conversation, Message, Role, ToolDefinition};

/// OpenAI tool schema: `{type: function, function: {name, description, parameters}}`
pub fn tool_schema(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema,
        }
    })
}

/// Build the request body for an OpenAI-compatible endpoint
pub fn encode_request(
    conversation: &Conversation,
    model: &str,
    tool_schemas: &[Value],
    options: &RequestOptions,
) -> Value {
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    if !options.system_prompt.is_empty() {
        messages.push(json!({"role": "system", "content": options.system_prompt}));
    }
    for message in conversation.messages() {
        encode_message(message, &mut messages);
    }

    let mut body = json!({
        "model": model,
        "messages": messages,
    });

    if !tool_schemas.is_empty() {
        body["tools"] = json!(tool_schemas);
    }

    body
}

/// One internal message may expand to several wire messages
fn encode_message(message: &Message, out: &mut Vec<Value>) {
    match message.role {
        Role::User => {
            // Tool messages must directly follow the assistant turn that requested them
            for block in &message.content {
                if let ContentBlock::ToolResult { invocation_id, content } = block {
                    out.push(json!({
                        "role": "tool",
                        "tool_call_id": invocation_id,
                        "content": content,
                    }));
                }
            }
            let text = message.text();
            if !text.is_empty() {
                out.push(json!({"role": "user", "content": text}));
            }
        }
        Role::Assistant => {
            let tool_calls: Vec<Value> = message
                .tool_invocations()
                .map(|(id, name, arguments)| {
                    json!({
                        "id": id,
                        "type": "function",
                        "function": {
                            "name": name,
                            "arguments": arguments.to_string(),
                        }
                    })
                })
                .collect();

            let mut encoded = json!({"role": "assistant"});
            let text = message.text();
            if !text.is_empty() || tool_calls.is_empty() {
                encoded["content"] = json!(text);
            }
            if !tool_calls.is_empty() {
                encoded["tool_calls"] = json!(tool_calls);
            }
            out.push(encoded);
        }
    }
}

/// Decode the first choice's message into content blocks
pub fn decode_response(body: &Value) -> Result<Vec<ContentBlock>, DecodeError> {
    let Some(choice) = body.get("choices").and_then(Value::as_array).and_then(|c| c.first()) else {
        return Ok(Vec::new());
    };
    let Some(message) = choice.get("message") else {
        return Ok(Vec::new());
    };

    let mut blocks = Vec::new();

    if let Some(text) = message.get("content").and_then(Value::as_str)
        && !text.is_empty()
    {
        blocks.push(ContentBlock::text(text));
    }

    if let Some(tool_calls) = message.get("tool_calls").and_then(Value::as_array) {
        for call in tool_calls {
            blocks.push(decode_tool_call(call)?);
        }
    }

    Ok(blocks)
}

fn decode_tool_call(call: &Value) -> Result<ContentBlock, DecodeError> {
    let id = call
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::Shape(format!("tool call missing 'id': {}", call)))?;
    let function = call
        .get("function")
        .ok_or_else(|| DecodeError::Shape(format!("tool call missing 'function': {}", call)))?;
    let name = function
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::Shape(format!("tool call missing function name: {}", call)))?;

    let arguments = match function.get("arguments") {
        Some(Value::String(raw)) => parse_arguments(name, raw)?,
        // A few compatible gateways send the object itself
        Some(object @ Value::Object(_)) => object.clone(),
        None | Some(Value::Null) => Value::Object(Default::default()),
        Some(other) => {
            return Err(DecodeError::Shape(format!("tool call arguments of unexpected type: {}", other)));
        }
    };

    Ok(ContentBlock::tool_invocation(id, name, arguments))
}
