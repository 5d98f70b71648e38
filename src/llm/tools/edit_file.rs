//! edit tool - Replace a specific string in a file

use async_trait::async_trait;
use eyre::eyre;
use serde_json::Value;

use super::context::{ToolError, required_str};
use super::{Tool, ToolContext, ToolOutput};

pub struct EditFileTool;

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn description(&self) -> &'static str {
        "Replace old with new in file (old must be unique unless all=true)"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "old": {"type": "string"},
                "new": {"type": "string"},
                "all": {"type": "boolean"}
            },
            "required": ["path", "old", "new"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput, eyre::Error> {
        let path = required_str(&input, "path")?;
        let old = required_str(&input, "old")?;
        let new = required_str(&input, "new")?;
        let replace_all = input["all"].as_bool().unwrap_or(false);

        if old.is_empty() {
            return Err(eyre!("old_string must not be empty"));
        }

        let full_path = ctx.resolve(path);
        let content = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|source| ToolError::Open {
                path: path.to_string(),
                source,
            })?;

        let count = content.matches(old).count();
        if count == 0 {
            return Err(eyre!("old_string not found"));
        }
        if count > 1 && !replace_all {
            return Err(eyre!(
                "old_string appears {} times, must be unique (use all=true)",
                count
            ));
        }

        let updated = if replace_all {
            content.replace(old, new)
        } else {
            content.replacen(old, new, 1)
        };

        tokio::fs::write(&full_path, updated)
            .await
            .map_err(|source| ToolError::Write {
                path: path.to_string(),
                source,
            })?;

        Ok(ToolOutput::success("ok"))
    }
}
