//! Configuration management for BlueQuery.
//!
//! All settings come from environment variables (optionally loaded from a
//! `.env` file at startup) and are read exactly once into a [`Config`]
//! that the rest of the service treats as read-only.

use crate::error::{BlueQueryError, Result};
use std::path::PathBuf;

/// Main configuration structure for BlueQuery.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file (`ARGO_DB_PATH`).
    pub db_path: PathBuf,

    /// Maximum number of rows fetched for a row-returning statement
    /// (`SQL_MAX_ROWS`).
    pub max_rows: usize,

    /// Statement execution timeout in seconds (`SQL_TIMEOUT_SECS`).
    pub query_timeout_secs: u64,

    /// LLM provider configuration.
    pub llm: LlmConfig,
}

/// LLM provider configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Provider selection override (`LLM_PROVIDER`).
    pub provider: ProviderChoice,

    /// Groq settings (`GROQ_API_KEY`, `GROQ_MODEL`, `GROQ_BASE_URL`).
    pub groq: ProviderSettings,

    /// xAI Grok settings (`GROK_API_KEY`, `GROK_MODEL`, `GROK_BASE_URL`).
    pub grok: ProviderSettings,
}

/// Credentials and endpoint for one chat-completions provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Bearer credential; empty means "not configured".
    pub api_key: String,

    /// Model name sent in the request payload.
    pub model: String,

    /// Full chat-completions endpoint URL.
    pub base_url: String,
}

/// Parsed value of `LLM_PROVIDER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    /// Pick the first provider with a non-empty credential.
    Auto,
    /// Force Groq, even if its credential is missing.
    Groq,
    /// Force Grok, even if its credential is missing.
    Grok,
    /// Unrecognized value; behaves as "no model configured".
    Disabled,
}

impl ProviderChoice {
    /// Parses the `LLM_PROVIDER` value. Unknown values disable the model
    /// rather than failing startup.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "auto" => Self::Auto,
            "groq" => Self::Groq,
            "grok" => Self::Grok,
            _ => Self::Disabled,
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("database/argo_floats_new.db")
}

fn default_max_rows() -> usize {
    200
}

fn default_query_timeout_secs() -> u64 {
    30
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_grok_model() -> String {
    "grok-2-latest".to_string()
}

fn default_grok_base_url() -> String {
    "https://api.x.ai/v1/chat/completions".to_string()
}

fn env_string(key: &str, default: fn() -> String) -> String {
    std::env::var(key).unwrap_or_else(|_| default())
}

fn env_trimmed(key: &str) -> String {
    std::env::var(key)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

fn parse_positive(key: &str, raw: Option<String>, default: u64) -> Result<u64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: u64 = raw.trim().parse().map_err(|_| {
        BlueQueryError::config(format!("{key} must be a positive integer, got '{raw}'"))
    })?;
    if value == 0 {
        return Err(BlueQueryError::config(format!("{key} must be at least 1")));
    }
    Ok(value)
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let db_path = std::env::var("ARGO_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        let max_rows = parse_positive(
            "SQL_MAX_ROWS",
            std::env::var("SQL_MAX_ROWS").ok(),
            default_max_rows() as u64,
        )? as usize;

        let query_timeout_secs = parse_positive(
            "SQL_TIMEOUT_SECS",
            std::env::var("SQL_TIMEOUT_SECS").ok(),
            default_query_timeout_secs(),
        )?;

        Ok(Self {
            db_path,
            max_rows,
            query_timeout_secs,
            llm: LlmConfig::from_env(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            max_rows: default_max_rows(),
            query_timeout_secs: default_query_timeout_secs(),
            llm: LlmConfig::default(),
        }
    }
}

impl LlmConfig {
    fn from_env() -> Self {
        // Unset means automatic selection; a set-but-unknown value disables
        // the model entirely.
        let provider = std::env::var("LLM_PROVIDER")
            .map(|v| ProviderChoice::parse(&v))
            .unwrap_or(ProviderChoice::Auto);
        Self {
            provider,
            groq: ProviderSettings {
                api_key: env_trimmed("GROQ_API_KEY"),
                model: env_string("GROQ_MODEL", default_groq_model),
                base_url: env_string("GROQ_BASE_URL", default_groq_base_url),
            },
            grok: ProviderSettings {
                api_key: env_trimmed("GROK_API_KEY"),
                model: env_string("GROK_MODEL", default_grok_model),
                base_url: env_string("GROK_BASE_URL", default_grok_base_url),
            },
        }
    }

    /// True when at least one provider has a credential.
    pub fn is_configured(&self) -> bool {
        !self.groq.api_key.is_empty() || !self.grok.api_key.is_empty()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderChoice::Auto,
            groq: ProviderSettings {
                api_key: String::new(),
                model: default_groq_model(),
                base_url: default_groq_base_url(),
            },
            grok: ProviderSettings {
                api_key: String::new(),
                model: default_grok_model(),
                base_url: default_grok_base_url(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_choice_parse_known_values() {
        assert_eq!(ProviderChoice::parse("auto"), ProviderChoice::Auto);
        assert_eq!(ProviderChoice::parse("groq"), ProviderChoice::Groq);
        assert_eq!(ProviderChoice::parse("grok"), ProviderChoice::Grok);
    }

    #[test]
    fn test_provider_choice_parse_normalizes_case_and_whitespace() {
        assert_eq!(ProviderChoice::parse("  GROQ "), ProviderChoice::Groq);
        assert_eq!(ProviderChoice::parse("Auto"), ProviderChoice::Auto);
    }

    #[test]
    fn test_provider_choice_parse_unknown_disables() {
        assert_eq!(ProviderChoice::parse("openai"), ProviderChoice::Disabled);
        assert_eq!(ProviderChoice::parse(""), ProviderChoice::Disabled);
    }

    #[test]
    fn test_parse_positive_uses_default_when_unset() {
        assert_eq!(parse_positive("SQL_MAX_ROWS", None, 200).unwrap(), 200);
    }

    #[test]
    fn test_parse_positive_accepts_valid_values() {
        let parsed = parse_positive("SQL_MAX_ROWS", Some("50".to_string()), 200).unwrap();
        assert_eq!(parsed, 50);
    }

    #[test]
    fn test_parse_positive_rejects_garbage() {
        let err = parse_positive("SQL_MAX_ROWS", Some("many".to_string()), 200).unwrap_err();
        assert!(err.to_string().contains("SQL_MAX_ROWS"));
    }

    #[test]
    fn test_parse_positive_rejects_zero() {
        let err = parse_positive("SQL_TIMEOUT_SECS", Some("0".to_string()), 30).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_default_config_matches_service_defaults() {
        let config = Config::default();
        assert_eq!(config.max_rows, 200);
        assert_eq!(config.query_timeout_secs, 30);
        assert_eq!(config.llm.provider, ProviderChoice::Auto);
        assert_eq!(config.llm.groq.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.grok.model, "grok-2-latest");
        assert!(!config.llm.is_configured());
    }

    #[test]
    fn test_is_configured_with_one_key() {
        let mut config = LlmConfig::default();
        config.grok.api_key = "xai-test".to_string();
        assert!(config.is_configured());
    }
}
