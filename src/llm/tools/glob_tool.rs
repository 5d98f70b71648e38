//! glob tool - Find files matching a glob pattern

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use glob::{MatchOptions, Pattern};
use serde_json::Value;

use super::context::{ToolError, required_str};
use super::{Tool, ToolContext, ToolOutput, walk_files};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

pub struct GlobTool;

#[async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &'static str {
        "glob"
    }

    fn description(&self) -> &'static str {
        "Find files by pattern, sorted by mtime"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pat": {"type": "string"},
                "path": {"type": "string"}
            },
            "required": ["pat"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput, eyre::Error> {
        let pat = required_str(&input, "pat")?.to_string();
        let base = ctx.resolve_base(input["path"].as_str());
        let pattern = Pattern::new(&pat).map_err(ToolError::from)?;

        let matches = tokio::task::spawn_blocking(move || find_matches(&base, &pattern, pat.contains('/'))).await?;

        if matches.is_empty() {
            return Ok(ToolOutput::success("none"));
        }

        let listing: Vec<String> = matches.iter().map(|p| p.display().to_string()).collect();
        Ok(ToolOutput::success(listing.join("\n")))
    }
}

/// A file matches on its path relative to `base` or on its file name. When the
/// pattern names a directory, the full path is tried as well. Newest first.
fn find_matches(base: &Path, pattern: &Pattern, has_separator: bool) -> Vec<PathBuf> {
    let mut matched: Vec<(SystemTime, PathBuf)> = walk_files(base)
        .into_iter()
        .filter(|path| {
            let relative = path.strip_prefix(base).unwrap_or(path);
            let by_name = path
                .file_name()
                .is_some_and(|name| pattern.matches_with(&name.to_string_lossy(), MATCH_OPTIONS));

            pattern.matches_path_with(relative, MATCH_OPTIONS)
                || by_name
                || (has_separator && pattern.matches_path_with(path, MATCH_OPTIONS))
        })
        .map(|path| {
            let mtime = std::fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (mtime, path)
        })
        .collect();

    matched.sort_by(|a, b| b.0.cmp(&a.0));
    matched.into_iter().map(|(_, path)| path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    async fn glob(dir: &tempfile::TempDir, input: Value) -> ToolOutput {
        let ctx = ToolContext::new(dir.path().to_path_buf());
        GlobTool.execute(input, &ctx).await.unwrap()
    }

    fn touch(path: &Path, age_secs: u64) {
        std::fs::write(path, "").unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        File::options().write(true).open(path).unwrap().set_modified(mtime).unwrap();
    }

    #[tokio::test]
    async fn test_glob_by_file_name() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("file1.txt"), "").unwrap();
        std::fs::write(dir.path().join("file2.txt"), "").unwrap();
        std::fs::write(dir.path().join("file.rs"), "").unwrap();

        let result = glob(&dir, serde_json::json!({"pat": "*.txt"})).await;

        assert!(result.content.contains("file1.txt"));
        assert!(result.content.contains("file2.txt"));
        assert!(!result.content.contains("file.rs"));
    }

    #[tokio::test]
    async fn test_glob_name_match_reaches_nested_files() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/nested/lib.rs"), "").unwrap();

        let result = glob(&dir, serde_json::json!({"pat": "*.rs"})).await;

        assert!(result.content.ends_with("src/nested/lib.rs"));
    }

    #[tokio::test]
    async fn test_glob_relative_path_pattern() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::create_dir_all(dir.path().join("tests")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), "").unwrap();
        std::fs::write(dir.path().join("tests/main.rs"), "").unwrap();

        let result = glob(&dir, serde_json::json!({"pat": "src/*.rs"})).await;

        assert_eq!(result.content.lines().count(), 1);
        assert!(result.content.contains("src/main.rs"));
    }

    #[tokio::test]
    async fn test_glob_sorted_newest_first() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("old.log"), 300);
        touch(&dir.path().join("new.log"), 0);
        touch(&dir.path().join("mid.log"), 100);

        let result = glob(&dir, serde_json::json!({"pat": "*.log"})).await;
        let names: Vec<&str> = result
            .content
            .lines()
            .map(|l| l.rsplit('/').next().unwrap())
            .collect();

        assert_eq!(names, vec!["new.log", "mid.log", "old.log"]);
    }

    #[tokio::test]
    async fn test_glob_with_base_path() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("top.md"), "").unwrap();
        std::fs::write(dir.path().join("sub/inner.md"), "").unwrap();

        let result = glob(&dir, serde_json::json!({"pat": "*.md", "path": "sub"})).await;

        assert!(result.content.contains("inner.md"));
        assert!(!result.content.contains("top.md"));
    }

    #[tokio::test]
    async fn test_glob_no_matches() {
        let dir = tempdir().unwrap();
        let result = glob(&dir, serde_json::json!({"pat": "*.zig"})).await;
        assert_eq!(result.content, "none");
    }

    #[tokio::test]
    async fn test_glob_missing_base_is_none() {
        let dir = tempdir().unwrap();
        let result = glob(&dir, serde_json::json!({"pat": "*", "path": "missing"})).await;
        assert_eq!(result.content, "none");
    }
}
