//! Provider selection
//!
//! Maps the active model name onto one of the two wire dialects, the endpoint
//! to talk to and the credential to present.

use std::fmt;

use crate::error::{NanocodeError, Result};

/// Anthropic API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const ANTHROPIC_HOST: &str = "api.anthropic.com";
const ANTHROPIC_PATH: &str = "/v1/messages";
const OPENROUTER_HOST: &str = "openrouter.ai";
const OPENROUTER_PATH: &str = "/api/v1/messages";
const GEMINI_HOST: &str = "generativelanguage.googleapis.com";
const GEMINI_PATH: &str = "/v1beta/openai/chat/completions";
const OPENAI_HOST: &str = "api.openai.com";
const OPENAI_PATH: &str = "/v1/chat/completions";

/// Request/response shape spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireDialect {
    Anthropic,
    OpenAiCompatible,
}

/// How the API key is presented
#[derive(Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// `x-api-key: <key>`
    ApiKeyHeader(String),
    /// `Authorization: Bearer <key>`
    Bearer(String),
}

impl fmt::Debug for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::ApiKeyHeader(_) => f.write_str("ApiKeyHeader(<redacted>)"),
            AuthScheme::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// API keys available to this process
#[derive(Clone, Default)]
pub struct Credentials {
    pub anthropic: Option<String>,
    pub openrouter: Option<String>,
    pub gemini: Option<String>,
    pub openai: Option<String>,
}

impl Credentials {
    /// Read keys from the process environment, ignoring empty values
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            anthropic: read("ANTHROPIC_API_KEY"),
            openrouter: read("OPENROUTER_API_KEY"),
            gemini: read("GEMINI_API_KEY"),
            openai: read("OPENAI_API_KEY"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anthropic.is_none() && self.openrouter.is_none() && self.gemini.is_none() && self.openai.is_none()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("anthropic", &self.anthropic.is_some())
            .field("openrouter", &self.openrouter.is_some())
            .field("gemini", &self.gemini.is_some())
            .field("openai", &self.openai.is_some())
            .finish()
    }
}

/// Everything needed to address one provider for one turn
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub wire_dialect: WireDialect,
    pub endpoint_host: String,
    pub endpoint_path: String,
    pub auth_scheme: AuthScheme,
    pub model_identifier: String,
}

impl ProviderProfile {
    /// Pick the provider for `model` and attach its credential
    pub fn resolve(model: &str, credentials: &Credentials) -> Result<Self> {
        let (wire_dialect, host, path, key, env_var) = if model.contains('/') {
            (
                WireDialect::Anthropic,
                OPENROUTER_HOST,
                OPENROUTER_PATH,
                &credentials.openrouter,
                "OPENROUTER_API_KEY",
            )
        } else if model.contains("gemini") || model.contains("learnlm") {
            (
                WireDialect::OpenAiCompatible,
                GEMINI_HOST,
                GEMINI_PATH,
                &credentials.gemini,
                "GEMINI_API_KEY",
            )
        } else if is_openai_model(model) {
            (
                WireDialect::OpenAiCompatible,
                OPENAI_HOST,
                OPENAI_PATH,
                &credentials.openai,
                "OPENAI_API_KEY",
            )
        } else {
            (
                WireDialect::Anthropic,
                ANTHROPIC_HOST,
                ANTHROPIC_PATH,
                &credentials.anthropic,
                "ANTHROPIC_API_KEY",
            )
        };

        let key = key.clone().ok_or_else(|| NanocodeError::MissingApiKey {
            env_var: env_var.to_string(),
        })?;

        // Direct Anthropic access is the only route that uses x-api-key
        let auth_scheme = if host == ANTHROPIC_HOST {
            AuthScheme::ApiKeyHeader(key)
        } else {
            AuthScheme::Bearer(key)
        };

        Ok(Self {
            wire_dialect,
            endpoint_host: host.to_string(),
            endpoint_path: path.to_string(),
            auth_scheme,
            model_identifier: model.to_string(),
        })
    }

    /// Full https URL of the endpoint
    pub fn url(&self) -> String {
        format!("https://{}{}", self.endpoint_host, self.endpoint_path)
    }
}

impl fmt::Debug for ProviderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderProfile")
            .field("wire_dialect", &self.wire_dialect)
            .field("endpoint_host", &self.endpoint_host)
            .field("endpoint_path", &self.endpoint_path)
            .field("auth_scheme", &self.auth_scheme)
            .field("model_identifier", &self.model_identifier)
            .finish()
    }
}

fn is_openai_model(model: &str) -> bool {
    ["gpt-", "o1", "o3", "o4"].iter().any(|prefix| model.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_keys() -> Credentials {
        Credentials {
            anthropic: Some("sk-ant".to_string()),
            openrouter: Some("sk-or".to_string()),
            gemini: Some("gm-key".to_string()),
            openai: Some("sk-oai".to_string()),
        }
    }

    #[test]
    fn test_claude_model_uses_anthropic_direct() {
        let profile = ProviderProfile::resolve("claude-3-5-haiku-20241022", &all_keys()).unwrap();
        assert_eq!(profile.wire_dialect, WireDialect::Anthropic);
        assert_eq!(profile.url(), "https://api.anthropic.com/v1/messages");
        assert_eq!(profile.auth_scheme, AuthScheme::ApiKeyHeader("sk-ant".to_string()));
    }

    #[test]
    fn test_slash_model_uses_openrouter_with_bearer() {
        let profile = ProviderProfile::resolve("anthropic/claude-3-7-sonnet", &all_keys()).unwrap();
        assert_eq!(profile.wire_dialect, WireDialect::Anthropic);
        assert_eq!(profile.endpoint_host, "openrouter.ai");
        assert_eq!(profile.auth_scheme, AuthScheme::Bearer("sk-or".to_string()));
        assert_eq!(profile.model_identifier, "anthropic/claude-3-7-sonnet");
    }

    #[test]
    fn test_gemini_model_uses_openai_dialect() {
        let profile = ProviderProfile::resolve("gemini-2.5-flash", &all_keys()).unwrap();
        assert_eq!(profile.wire_dialect, WireDialect::OpenAiCompatible);
        assert_eq!(profile.endpoint_path, "/v1beta/openai/chat/completions");
        assert_eq!(profile.auth_scheme, AuthScheme::Bearer("gm-key".to_string()));
    }

    #[test]
    fn test_gpt_model_uses_openai() {
        let profile = ProviderProfile::resolve("gpt-4o-mini", &all_keys()).unwrap();
        assert_eq!(profile.wire_dialect, WireDialect::OpenAiCompatible);
        assert_eq!(profile.url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_missing_key_names_variable() {
        let err = ProviderProfile::resolve("gemini-2.5-pro", &Credentials::default()).unwrap_err();
        assert!(matches!(err, NanocodeError::MissingApiKey { ref env_var } if env_var == "GEMINI_API_KEY"));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let profile = ProviderProfile::resolve("claude-3-5-sonnet-20241022", &all_keys()).unwrap();
        let debug = format!("{:?} {:?}", profile, all_keys());
        assert!(!debug.contains("sk-ant"));
        assert!(!debug.contains("sk-or"));
        assert!(debug.contains("api.anthropic.com"));
    }
}
