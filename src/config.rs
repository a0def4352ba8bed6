//! Environment-driven configuration for a question-answering run.

use std::env;
use thiserror::Error;

/// Default model identifier sent to the completion endpoint.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4";

/// Errors encountered while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables were not provided.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),
}

/// Runtime configuration, loaded once at startup and passed to every client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Confluence instance.
    pub confluence_url: String,
    /// Account used for Basic authentication against Confluence.
    pub confluence_username: String,
    /// API token paired with the username.
    pub confluence_api_token: String,
    /// API key for the completion endpoint.
    pub openai_api_key: String,
    /// Optional model override; defaults to [`DEFAULT_COMPLETION_MODEL`].
    pub openai_model: Option<String>,
    /// Optional completion base URL override, for self-hosted gateways.
    pub openai_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every missing required variable is collected before failing, so the
    /// startup diagnostic lists the full set in one pass.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let confluence_url = load_env("CONFLUENCE_URL", &mut missing);
        let confluence_username = load_env("CONFLUENCE_USERNAME", &mut missing);
        let confluence_api_token = load_env("CONFLUENCE_API_TOKEN", &mut missing);
        let openai_api_key = load_env("OPENAI_API_KEY", &mut missing);

        let (
            Some(confluence_url),
            Some(confluence_username),
            Some(confluence_api_token),
            Some(openai_api_key),
        ) = (
            confluence_url,
            confluence_username,
            confluence_api_token,
            openai_api_key,
        )
        else {
            return Err(ConfigError::MissingVariables(missing));
        };

        Ok(Self {
            confluence_url,
            confluence_username,
            confluence_api_token,
            openai_api_key,
            openai_model: load_env_optional("OPENAI_MODEL"),
            openai_base_url: load_env_optional("OPENAI_BASE_URL"),
        })
    }
}

/// Read a `.env` file when present, then load configuration.
pub fn load() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        confluence_url = %config.confluence_url,
        user = %config.confluence_username,
        model = %config
            .openai_model
            .as_deref()
            .unwrap_or(DEFAULT_COMPLETION_MODEL),
        "Loaded configuration"
    );
    Ok(config)
}

fn load_env(key: &str, missing: &mut Vec<String>) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            missing.push(key.to_string());
            None
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
