//! Tool execution context - the directory tools operate in

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Execution context shared by all tools of one session
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Relative paths and shell commands resolve against this directory
    pub workdir: PathBuf,
    /// Print command output to the terminal while it runs
    pub echo_output: bool,
}

impl ToolContext {
    pub fn new(workdir: PathBuf) -> Self {
        Self {
            workdir,
            echo_output: false,
        }
    }

    pub fn with_echo_output(mut self, echo: bool) -> Self {
        self.echo_output = echo;
        self
    }

    /// Context rooted at the process working directory, shown as `.`
    pub fn current_dir() -> Self {
        Self::new(PathBuf::from("."))
    }

    /// Resolve a tool-supplied path against the working directory
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() { path.to_path_buf() } else { self.workdir.join(path) }
    }

    /// Base directory argument: missing or empty means the working directory
    pub fn resolve_base(&self, path: Option<&str>) -> PathBuf {
        match path {
            Some(p) if !p.is_empty() => self.resolve(p),
            _ => self.workdir.clone(),
        }
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self::current_dir()
    }
}

/// Errors that can occur during tool execution
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("missing required argument '{name}'")]
    MissingArgument { name: String },

    #[error("could not open {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not open {path} for writing")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command timed out after {timeout_ms}ms")]
    CommandTimeout { timeout_ms: u64 },

    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    #[error("invalid glob pattern: {0}")]
    InvalidGlob(#[from] glob::PatternError),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { status: u16, url: String },
}

/// Required string argument
pub(crate) fn required_str<'a>(input: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    input[name].as_str().ok_or_else(|| ToolError::MissingArgument { name: name.to_string() })
}
