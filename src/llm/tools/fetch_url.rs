//! fetch_url tool - HTTP GET a page and return its text

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::context::{ToolError, required_str};
use super::{Tool, ToolContext, ToolOutput};

/// Longest body returned to the model, in characters
const MAX_CHARS: usize = 30_000;

pub struct FetchUrlTool;

#[async_trait]
impl Tool for FetchUrlTool {
    fn name(&self) -> &'static str {
        "fetch_url"
    }

    fn description(&self) -> &'static str {
        "Fetch a URL and return the response body as text"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {"type": "string"}
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: Value, _ctx: &ToolContext) -> Result<ToolOutput, eyre::Error> {
        let url = required_str(&input, "url")?;
        debug!("fetch_url: GET {}", url);

        let client = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        let response = client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let body = response.text().await?;
        Ok(ToolOutput::success(truncate_chars(&body, MAX_CHARS)))
    }
}

/// At most `max` characters of `text`, never splitting a character
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
