//! Tool executor - manages tool registration and execution

use std::collections::HashMap;

use log::{debug, info};
use serde_json::Value;

use super::{
    BashTool, EditFileTool, FetchUrlTool, GlobTool, GrepTool, ReadFileTool, Tool, ToolContext, WriteFileTool,
};
use crate::llm::types::ToolDefinition;

/// Why a tool invocation produced no regular output. Rendered as text and
/// fed back to the model; never ends the round.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown tool {name}")]
    UnknownTool { name: String },

    #[error("{message}")]
    Failed { name: String, message: String },
}

/// Registry of the tools offered to the model
pub struct ToolExecutor {
    tools: HashMap<String, Box<dyn Tool>>,
    ctx: ToolContext,
}

impl ToolExecutor {
    /// Create executor with the standard tool set
    pub fn standard(ctx: ToolContext) -> Self {
        let mut executor = Self::new(ctx);

        // File system tools
        executor.add_tool(Box::new(ReadFileTool));
        executor.add_tool(Box::new(WriteFileTool));
        executor.add_tool(Box::new(EditFileTool));
        executor.add_tool(Box::new(GlobTool));

        // Search
        executor.add_tool(Box::new(GrepTool));

        // Command execution and network
        executor.add_tool(Box::new(BashTool));
        executor.add_tool(Box::new(FetchUrlTool));

        executor
    }

    /// Create an empty executor (for custom tool sets)
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            tools: HashMap::new(),
            ctx,
        }
    }

    /// Add a tool, replacing any tool of the same name
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Tool definitions for the request, in name order so requests are stable
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Run one tool by name
    pub async fn dispatch(&self, name: &str, arguments: Value) -> Result<String, DispatchError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| DispatchError::UnknownTool { name: name.to_string() })?;

        info!("Running tool {}", name);
        let failed = |message: String| DispatchError::Failed {
            name: name.to_string(),
            message,
        };

        match tool.execute(arguments, &self.ctx).await {
            Ok(output) if output.is_error => Err(failed(output.content)),
            Ok(output) => Ok(output.content),
            Err(e) => Err(failed(e.to_string())),
        }
    }

    /// Boundary call: success text, or an error string that is also meant
    /// for the model
    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<String, String> {
        self.dispatch(name, arguments).await.map_err(|e| {
            debug!("Tool {} failed: {}", name, e);
            format!("error: {}", e)
        })
    }

    /// Names of registered tools, sorted
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::standard(ToolContext::default())
    }
}
