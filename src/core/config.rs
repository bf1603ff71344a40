//! Runtime configuration: completion endpoint, model, credential, retry policy.

use std::env;
use std::time::Duration;

use async_openai::config::OpenAIConfig;

pub const API_KEY_VAR: &str = "TOGETHER_API_KEY";
const BASE_URL_VAR: &str = "CHAT_EDITOR_BASE_URL";
const MODEL_VAR: &str = "CHAT_EDITOR_MODEL";
const MAX_TOKENS_VAR: &str = "CHAT_EDITOR_MAX_TOKENS";

pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Bounded retry with a fixed wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            wait: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model_id: String,
    pub max_tokens: u32,
    pub retry: RetryPolicy,
}

/// Values from the command line that take precedence over the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{} is not set", API_KEY_VAR)]
    MissingApiKey,
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    /// Load configuration from environment, then apply CLI overrides.
    /// A missing API key is not an error here; only completions need it.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        let base_url = env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let model_id = match overrides.model {
            Some(m) => m,
            None => env::var(MODEL_VAR).unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        };

        let max_tokens = match overrides.max_tokens {
            Some(n) => n,
            None => match env::var(MAX_TOKENS_VAR) {
                Ok(raw) => parse_max_tokens(&raw)?,
                Err(_) => DEFAULT_MAX_TOKENS,
            },
        };

        Ok(Config {
            base_url,
            api_key,
            model_id,
            max_tokens,
            retry: RetryPolicy::default(),
        })
    }

    /// async-openai client config for the completion endpoint.
    pub fn openai_config(&self) -> Result<OpenAIConfig, ConfigError> {
        let key = self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;
        Ok(OpenAIConfig::new()
            .with_api_base(self.base_url.clone())
            .with_api_key(key))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn parse_max_tokens(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            var: MAX_TOKENS_VAR,
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidValue {
            var: MAX_TOKENS_VAR,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
