//! Tool system for LLM interactions
//!
//! Each tool is a boundary call `(arguments) -> output | error`. Errors are
//! not fatal: the executor renders them into text that is fed back to the
//! model so it can correct itself.

mod bash;
mod context;
mod edit_file;
mod executor;
mod fetch_url;
mod glob_tool;
mod grep;
mod read_file;
mod write_file;

pub use context::{ToolContext, ToolError};
pub use executor::{DispatchError, ToolExecutor};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the invocation name sent by the model)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput, eyre::Error>;
}

/// Output of one tool execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

pub use bash::BashTool;
pub use edit_file::EditFileTool;
pub use fetch_url::FetchUrlTool;
pub use glob_tool::GlobTool;
pub use grep::GrepTool;
pub use read_file::ReadFileTool;
pub use write_file::WriteFileTool;

/// Every regular file under `root`, depth first. Unreadable directories are
/// skipped and symlinked directories are not followed.
pub(crate) fn walk_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping {}: {}", dir.display(), e);
                continue;
            }
        };

        let mut children: Vec<_> = entries.filter_map(|entry| entry.ok()).collect();
        children.sort_by_key(|entry| entry.file_name());

        // Reverse so that popping visits children in name order
        for entry in children.into_iter().rev() {
            let path = entry.path();
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => pending.push(path),
                Ok(_) if path.is_file() => files.push(path),
                _ => {}
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_tool_output_success() {
        let result = ToolOutput::success("Operation completed");
        assert_eq!(result.content, "Operation completed");
        assert!(!result.is_error);
    }

    #[test]
    fn test_tool_output_error() {
        let result = ToolOutput::error("Something went wrong");
        assert_eq!(result.content, "Something went wrong");
        assert!(result.is_error);
    }

    #[test]
    fn test_walk_files_recurses() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top.txt"), "").unwrap();
        std::fs::write(dir.path().join("a/mid.txt"), "").unwrap();
        std::fs::write(dir.path().join("a/b/deep.txt"), "").unwrap();

        let mut names: Vec<String> = walk_files(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["deep.txt", "mid.txt", "top.txt"]);
    }

    #[test]
    fn test_walk_files_missing_root() {
        assert!(walk_files(Path::new("/definitely/not/here")).is_empty());
    }
}
