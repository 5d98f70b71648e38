//! read tool - Read file contents with line numbers

use async_trait::async_trait;
use serde_json::Value;

use super::context::{ToolError, required_str};
use super::{Tool, ToolContext, ToolOutput};

pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read"
    }

    fn description(&self) -> &'static str {
        "Read file with line numbers (file path, not directory)"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {"type": "string"},
                "offset": {"type": "integer"},
                "limit": {"type": "integer"}
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput, eyre::Error> {
        let path = required_str(&input, "path")?;
        let offset = input["offset"].as_i64().unwrap_or(0).max(0) as usize;
        let limit = input["limit"].as_i64().filter(|l| *l >= 0).map(|l| l as usize);

        let content = tokio::fs::read_to_string(ctx.resolve(path))
            .await
            .map_err(|source| ToolError::Open {
                path: path.to_string(),
                source,
            })?;

        let numbered: String = content
            .lines()
            .enumerate()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|(i, line)| format!("{:4}| {}\n", i + 1, line))
            .collect();

        Ok(ToolOutput::success(numbered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn read(dir: &tempfile::TempDir, input: Value) -> Result<ToolOutput, eyre::Error> {
        let ctx = ToolContext::new(dir.path().to_path_buf());
        ReadFileTool.execute(input, &ctx).await
    }

    #[tokio::test]
    async fn test_read_file_line_numbers() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), "a\nb\nc").unwrap();

        let result = read(&dir, serde_json::json!({"path": "test.txt"})).await.unwrap();

        assert!(!result.is_error);
        assert_eq!(result.content, "   1| a\n   2| b\n   3| c\n");
    }

    #[tokio::test]
    async fn test_read_file_offset_is_zero_based() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), "line 1\nline 2\nline 3\nline 4\nline 5").unwrap();

        let result = read(&dir, serde_json::json!({"path": "test.txt", "offset": 2, "limit": 2}))
            .await
            .unwrap();

        assert_eq!(result.content, "   3| line 3\n   4| line 4\n");
    }

    #[tokio::test]
    async fn test_read_file_offset_past_end() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("test.txt"), "only\n").unwrap();

        let result = read(&dir, serde_json::json!({"path": "test.txt", "offset": 10}))
            .await
            .unwrap();

        assert_eq!(result.content, "");
    }

    #[tokio::test]
    async fn test_read_file_not_found() {
        let dir = tempdir().unwrap();

        let err = read(&dir, serde_json::json!({"path": "nonexistent.txt"})).await.unwrap_err();

        assert_eq!(err.to_string(), "could not open nonexistent.txt");
    }

    #[tokio::test]
    async fn test_read_file_missing_path() {
        let dir = tempdir().unwrap();
        assert!(read(&dir, serde_json::json!({})).await.is_err());
    }
}
