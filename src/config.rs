// ABOUTME: Startup configuration read from environment variables.
// ABOUTME: Holds the model settings and where to find Google credentials.

use std::path::PathBuf;

use crate::agent::DEFAULT_MAX_ITERATIONS;
use crate::error::ConfigError;
use crate::llm::{DEFAULT_BASE_URL, OpenAIClient};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Settings for one process.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    pub credentials_path: PathBuf,
    pub max_iterations: usize,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let max_iterations = match get("SHEET_AGENT_MAX_ITERATIONS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "SHEET_AGENT_MAX_ITERATIONS".to_string(),
                        format!("expected a positive integer, got '{}'", raw),
                    ));
                }
            },
            None => DEFAULT_MAX_ITERATIONS,
        };

        Ok(Self {
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("SHEET_AGENT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            credentials_path: get("GOOGLE_CREDENTIALS_PATH")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string())
                .into(),
            max_iterations,
        })
    }

    /// Build the chat client these settings describe.
    pub fn openai_client(&self) -> OpenAIClient {
        OpenAIClient::new(&self.openai_api_key).with_base_url(&self.openai_base_url)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("credentials_path", &self.credentials_path)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.max_iterations, 8);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
            ("SHEET_AGENT_MODEL", "gpt-4o"),
            ("GOOGLE_CREDENTIALS_PATH", "/etc/sheets/sa.json"),
            ("SHEET_AGENT_MAX_ITERATIONS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.openai_base_url, "http://localhost:11434/v1");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.credentials_path, PathBuf::from("/etc/sheets/sa.json"));
        assert_eq!(config.max_iterations, 3);
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::from_lookup(lookup(&[("SHEET_AGENT_MODEL", "gpt-4o")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref var) if var == "OPENAI_API_KEY"));

        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_invalid_max_iterations() {
        for raw in ["zero", "0", "-1"] {
            let err = Config::from_lookup(lookup(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("SHEET_AGENT_MAX_ITERATIONS", raw),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(..)), "{}", raw);
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
