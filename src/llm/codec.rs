//! Wire codec front
//!
//! Dispatches conversation encoding and response decoding to the dialect
//! selected by the active [`ProviderProfile`]. The two dialects are a closed
//! set; each lives in its own module.

use serde_json::Value;
use thiserror::Error;

use super::provider::{ProviderProfile, WireDialect};
use super::types::{ContentBlock, Conversation, ToolDefinition};
use super::{anthropic, openai};

/// Default max tokens for Anthropic-dialect requests
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Errors decoding a provider response or stream event
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("JSON Parse Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Invalid arguments for tool '{name}': {source}")]
    ToolArguments {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("API Error: {0}")]
    Api(String),
}

/// Per-request knobs that are not part of the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub system_prompt: String,
    pub max_tokens: u32,
    pub stream: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
        }
    }
}

/// Build the provider-specific request body for `conversation`
pub fn encode_request(
    conversation: &Conversation,
    profile: &ProviderProfile,
    tools: &[ToolDefinition],
    options: &RequestOptions,
) -> Value {
    let schemas = build_tool_schemas(tools, profile.wire_dialect);
    let model = &profile.model_identifier;
    let mut body = match profile.wire_dialect {
        WireDialect::Anthropic => anthropic::encode_request(conversation, model, &schemas, options),
        WireDialect::OpenAiCompatible => openai::encode_request(conversation, model, &schemas, options),
    };

    if options.stream {
        body["stream"] = Value::Bool(true);
    }

    body
}

/// Decode a complete (non-streamed) response body into content blocks
pub fn decode_response(raw_body: &[u8], profile: &ProviderProfile) -> Result<Vec<ContentBlock>, DecodeError> {
    let parsed: Value = serde_json::from_slice(raw_body)?;

    // Some gateways wrap the response object in a one-element array
    let body = match parsed {
        Value::Array(mut items) if items.first().is_some_and(Value::is_object) => items.swap_remove(0),
        value @ Value::Object(_) => value,
        _ => {
            return Err(DecodeError::Shape(
                "API response is not a JSON object nor an object array".to_string(),
            ));
        }
    };

    if let Some(error) = body.get("error") {
        return Err(DecodeError::Api(api_error_message(error)));
    }

    match profile.wire_dialect {
        WireDialect::Anthropic => anthropic::decode_response(&body),
        WireDialect::OpenAiCompatible => openai::decode_response(&body),
    }
}

/// Serialize tool definitions in the dialect's schema shape
pub fn build_tool_schemas(tools: &[ToolDefinition], dialect: WireDialect) -> Vec<Value> {
    match dialect {
        WireDialect::Anthropic => tools.iter().map(anthropic::tool_schema).collect(),
        WireDialect::OpenAiCompatible => tools.iter().map(openai::tool_schema).collect(),
    }
}

/// Parse a fully concatenated tool argument string. Empty means no arguments.
pub(crate) fn parse_arguments(name: &str, raw: &str) -> Result<Value, DecodeError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(|source| DecodeError::ToolArguments {
        name: name.to_string(),
        source,
    })
}

/// Human-readable text of an API `error` object
pub(crate) fn api_error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}
