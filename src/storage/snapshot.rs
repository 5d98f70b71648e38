//! Snapshot save/load

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NanocodeError, Result};
use crate::llm::types::Message;

/// Persisted conversation plus the model it was held with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Absent for legacy files; the current model is then kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Snapshot {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: Some(model.into()),
            messages,
        }
    }

    /// Write the snapshot as JSON, replacing any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .map_err(|e| NanocodeError::Storage(format!("Failed to open {} for writing: {}", path.display(), e)))?;
        info!("Saved {} messages to {}", self.messages.len(), path.display());
        Ok(())
    }

    /// Read a snapshot object or a legacy bare message array
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NanocodeError::Storage(format!("Failed to open {} for reading: {}", path.display(), e)))?;

        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| NanocodeError::Storage(format!("Failed to parse {} ({})", path.display(), e)))?;

        let snapshot = match parsed {
            Value::Object(_) => serde_json::from_value(parsed)?,
            Value::Array(_) => Self {
                model: None,
                messages: serde_json::from_value(parsed)?,
            },
            _ => {
                return Err(NanocodeError::Storage(format!(
                    "Invalid save file format in {}",
                    path.display()
                )));
            }
        };

        info!("Loaded {} messages from {}", snapshot.messages.len(), path.display());
        Ok(snapshot)
    }

    /// Whether this came from a legacy bare-array file
    pub fn is_legacy(&self) -> bool {
        self.model.is_none()
    }
}
