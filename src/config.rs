//! Credentials and endpoints, read once from the environment by the binary
//! and handed to each client at construction.

use std::env;
use std::fmt;

const DEFAULT_SERP_URL: &str = "https://serpapi.com/search";
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "o3-mini";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set (export it or add it to .env)")]
    Missing(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct SerpConfig {
    pub api_key: ApiKey,
    pub endpoint: String,
}

impl SerpConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_SERP_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = required("SERP_API_KEY")?;
        let config = Self::new(ApiKey::new(api_key));
        Ok(match optional("SERP_API_URL") {
            Some(endpoint) => config.with_endpoint(&endpoint),
            None => config,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: ApiKey,
    pub model: String,
    pub base_url: String,
}

impl ModelConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(ApiKey::new(required("OPENAI_API_KEY")?));
        if let Some(model) = optional("OPENAI_MODEL") {
            config = config.with_model(&model);
        }
        if let Some(base) = optional("OPENAI_BASE_URL") {
            config = config.with_base_url(&base);
        }
        Ok(config)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
