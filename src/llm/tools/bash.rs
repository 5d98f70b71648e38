//! bash tool - Execute shell commands in the working directory

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use super::context::{ToolError, required_str};
use super::{Tool, ToolContext, ToolOutput};

const DEFAULT_TIMEOUT_MS: u64 = 120_000;

pub struct BashTool;

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &'static str {
        "bash"
    }

    fn description(&self) -> &'static str {
        "Run shell command"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "cmd": {"type": "string"},
                "timeout_ms": {
                    "type": "integer",
                    "description": "Timeout in milliseconds (default: 120000)"
                }
            },
            "required": ["cmd"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> Result<ToolOutput, eyre::Error> {
        let cmd = required_str(&input, "cmd")?;
        let timeout_ms = input["timeout_ms"].as_u64().unwrap_or(DEFAULT_TIMEOUT_MS);

        // Group the command so a trailing comment cannot swallow the redirect
        let script = format!("{{ {}\n}} 2>&1", cmd);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&script)
            .current_dir(&ctx.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        let stdout = child.stdout.take().ok_or_else(|| eyre::eyre!("bash stdout was not captured"))?;

        let collect = async {
            let mut reader = BufReader::new(stdout);
            let mut collected = String::new();
            let mut line = Vec::new();
            while reader.read_until(b'\n', &mut line).await? > 0 {
                let text = String::from_utf8_lossy(&line);
                if ctx.echo_output {
                    println!("{}", format!("  │ {}", text.trim_end_matches(['\n', '\r'])).dimmed());
                }
                collected.push_str(&text);
                line.clear();
            }
            child.wait().await?;
            Ok::<_, std::io::Error>(collected)
        };

        // Dropping the child on timeout kills it
        let text = tokio::time::timeout(Duration::from_millis(timeout_ms), collect)
            .await
            .map_err(|_| ToolError::CommandTimeout { timeout_ms })??;
        let trimmed = text.trim_end_matches(['\n', '\r']);

        if trimmed.is_empty() {
            Ok(ToolOutput::success("(empty)"))
        } else {
            Ok(ToolOutput::success(trimmed))
        }
    }
}
