//! write tool - Write content to a file

use async_trait::async_trait;
use serde_json::Value;

use super::context::{ToolError, required_str};
use super::{Tool, ToolContext, ToolOutput};

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write"
    }

    fn description(&self) -> &'static str {
        "Write content to file"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "content": {"type": "string"}
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput, eyre::Error> {
        let path = required_str(&input, "path")?;
        let content = required_str(&input, "content")?;
        let full_path = ctx.resolve(path);

        let write_error = |source| ToolError::Write {
            path: path.to_string(),
            source,
        };

        if let Some(parent) = full_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        tokio::fs::write(&full_path, content).await.map_err(write_error)?;

        Ok(ToolOutput::success("ok"))
    }
}
