//! Error types for nanocode
//!
//! Centralized error handling using thiserror. Module-level errors
//! (transport, decode) convert into [`NanocodeError`] with `?`.

use thiserror::Error;

use crate::llm::codec::DecodeError;
use crate::llm::transport::TransportError;

/// All error types that can end a turn or a command
#[derive(Debug, Error)]
pub enum NanocodeError {
    /// Connection, TLS or HTTP status failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed or unexpected response/event JSON
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The selected provider has no credential configured
    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Snapshot save/load error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for nanocode operations
pub type Result<T> = std::result::Result<T, NanocodeError>;
