use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::llm::Credentials;

/// Model used when nothing else picks one
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
const OPENROUTER_DEFAULT_MODEL: &str = "anthropic/claude-3-7-sonnet";
const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Files read into the environment before credentials, in order
const ENV_FILES: [&str; 2] = [".nanocoderc", ".env"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Only used when set here; otherwise the model follows the configured keys
    pub model: Option<String>,
    pub max_tokens: u32,
    pub system_prompt: String,
    pub stream: bool,
    pub connect_timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 8192,
            system_prompt: "Concise coding assistant.".to_string(),
            stream: true,
            connect_timeout_ms: 30000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Load `~/.nanocoderc`, `./.nanocoderc` and `./.env` into the environment.
///
/// Variables that are already set win over file contents.
pub fn load_env_files() {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(ENV_FILES[0]));
    }
    candidates.extend(ENV_FILES.iter().map(PathBuf::from));

    for path in candidates {
        if !path.is_file() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(()) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) => log::warn!("Failed to load {}: {}", path.display(), e),
        }
    }
}

/// Pick the model for the first turn.
///
/// Explicit choices come first (flag, `MODEL`, config file). Without one the
/// default follows the available keys.
pub fn initial_model(
    cli_model: Option<&str>,
    env_model: Option<&str>,
    config: &LlmConfig,
    credentials: &Credentials,
) -> String {
    let explicit = [cli_model, env_model, config.model.as_deref()]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty());
    if let Some(model) = explicit {
        return model.to_string();
    }

    if credentials.openrouter.is_some() {
        OPENROUTER_DEFAULT_MODEL.to_string()
    } else if credentials.gemini.is_some() && credentials.anthropic.is_none() {
        GEMINI_DEFAULT_MODEL.to_string()
    } else {
        DEFAULT_MODEL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn keys(anthropic: bool, openrouter: bool, gemini: bool) -> Credentials {
        let key = |set: bool| set.then(|| "k".to_string());
        Credentials {
            anthropic: key(anthropic),
            openrouter: key(openrouter),
            gemini: key(gemini),
            openai: None,
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert!(config.llm.model.is_none());
        assert_eq!(config.llm.max_tokens, 8192);
        assert!(config.llm.stream);
        assert_eq!(config.llm.connect_timeout_ms, 30000);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nanocode.yml");
        std::fs::write(&path, "llm:\n  model: gpt-4o\n  stream: false\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.llm.model.as_deref(), Some("gpt-4o"));
        assert!(!config.llm.stream);
        assert_eq!(config.llm.max_tokens, 8192);
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_explicit_path_errors_are_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yml");
        std::fs::write(&path, "llm: [not, a, map]").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));

        let missing = dir.path().join("missing.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_initial_model_explicit_precedence() {
        let config = LlmConfig {
            model: Some("from-config".to_string()),
            ..Default::default()
        };
        let creds = keys(true, false, false);

        assert_eq!(initial_model(Some("flag"), Some("env"), &config, &creds), "flag");
        assert_eq!(initial_model(None, Some("env"), &config, &creds), "env");
        assert_eq!(initial_model(None, None, &config, &creds), "from-config");
    }

    #[test]
    fn test_initial_model_follows_keys() {
        let config = LlmConfig::default();

        assert_eq!(initial_model(None, None, &config, &keys(true, false, false)), DEFAULT_MODEL);
        assert_eq!(
            initial_model(None, None, &config, &keys(false, true, false)),
            "anthropic/claude-3-7-sonnet"
        );
        assert_eq!(initial_model(None, None, &config, &keys(false, false, true)), "gemini-2.5-flash");
        assert_eq!(initial_model(None, None, &config, &keys(true, false, true)), DEFAULT_MODEL);
        assert_eq!(
            initial_model(None, None, &config, &keys(true, true, true)),
            "anthropic/claude-3-7-sonnet"
        );
    }

    #[test]
    fn test_initial_model_ignores_blank() {
        let config = LlmConfig::default();
        assert_eq!(
            initial_model(Some("  "), None, &config, &keys(true, false, false)),
            DEFAULT_MODEL
        );
        assert_eq!(initial_model(Some(""), Some("env"), &config, &keys(true, false, false)), "env");
    }
}
