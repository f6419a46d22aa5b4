use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SYSTEM_PROMPT_PATH: &str = "prompt_templates/system_prompt.txt";
pub const DEFAULT_USER_PROMPT_PATH: &str = "prompt_templates/user_prompt.txt";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub system_prompt_path: PathBuf,
    pub user_prompt_path: PathBuf,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    /// Values from `.env` override the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv_override().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Config::from_env`] with an explicit env file, which must exist.
    pub fn from_env_file(path: &Path) -> anyhow::Result<Self> {
        dotenvy::from_path_override(path)
            .with_context(|| format!("failed to load {}", path.display()))?;

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            port: var("APP_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("APP_PORT must be a number")?,
            environment: var("APP_ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: var("OPENAI_BASE_URL"),
            system_prompt_path: var("SYSTEM_PROMPT_PATH")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT_PATH.to_string())
                .into(),
            user_prompt_path: var("USER_PROMPT_PATH")
                .unwrap_or_else(|| DEFAULT_USER_PROMPT_PATH.to_string())
                .into(),
            otel_service_name: var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| "prompt-service".to_string()),
            otel_exporter_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:4317".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert!(config.openai_api_key.is_none());
        assert!(config.openai_base_url.is_none());
        assert_eq!(
            config.system_prompt_path,
            PathBuf::from("prompt_templates/system_prompt.txt")
        );
        assert_eq!(
            config.user_prompt_path,
            PathBuf::from("prompt_templates/user_prompt.txt")
        );
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("APP_PORT", "9000"),
            ("APP_ENVIRONMENT", "production"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4.1-mini"),
            ("OPENAI_BASE_URL", "http://localhost:1234/v1"),
            ("USER_PROMPT_PATH", "/etc/prompts/user.txt"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.is_production());
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai_model, "gpt-4.1-mini");
        assert_eq!(
            config.openai_base_url.as_deref(),
            Some("http://localhost:1234/v1")
        );
        assert_eq!(config.user_prompt_path, PathBuf::from("/etc/prompts/user.txt"));
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_MODEL", "  "),
            ("OPENAI_API_KEY", ""),
        ]))
        .unwrap();
        assert_eq!(config.openai_model, DEFAULT_MODEL);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_env_file_overrides_process_environment() {
        let dir = tempfile::tempdir().unwrap();
        let process_env = dir.path().join("process.env");
        let dotenv = dir.path().join(".env");
        std::fs::write(&process_env, "OPENAI_MODEL=from-process\n").unwrap();
        std::fs::write(&dotenv, "OPENAI_MODEL=from-dotenv\n").unwrap();

        dotenvy::from_path_override(&process_env).unwrap();
        assert_eq!(env::var("OPENAI_MODEL").unwrap(), "from-process");

        let config = Config::from_env_file(&dotenv).unwrap();
        assert_eq!(config.openai_model, "from-dotenv");
    }

    #[test]
    fn test_env_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_env_file(&dir.path().join(".env")).is_err());
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[("APP_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
