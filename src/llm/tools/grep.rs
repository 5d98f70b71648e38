//! grep tool - Search file contents with regex

use std::path::Path;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use super::context::{ToolError, required_str};
use super::{Tool, ToolContext, ToolOutput, walk_files};

/// Hits returned before the search stops
const MAX_HITS: usize = 50;

pub struct GrepTool;

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &'static str {
        "grep"
    }

    fn description(&self) -> &'static str {
        "Search files for regex pattern"
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
        let pat = required_str(&input, "pat")?;
        let regex = Regex::new(pat).map_err(ToolError::from)?;
        let base = ctx.resolve_base(input["path"].as_str());

        let hits = tokio::task::spawn_blocking(move || search(&base, &regex)).await?;

        if hits.is_empty() {
            Ok(ToolOutput::success("none"))
        } else {
            Ok(ToolOutput::success(hits.join("\n")))
        }
    }
}

fn search(base: &Path, regex: &Regex) -> Vec<String> {
    let files = if base.is_file() { vec![base.to_path_buf()] } else { walk_files(base) };

    let mut hits = Vec::new();
    for path in files {
        // Binary and non-UTF-8 files are skipped
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        for (i, line) in content.lines().enumerate() {
            if regex.is_match(line) {
                hits.push(format!("{}:{}:{}", path.display(), i + 1, line));
                if hits.len() >= MAX_HITS {
                    return hits;
                }
            }
        }
    }
    hits
}
