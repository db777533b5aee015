//! Ollama configuration

use agri_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Ollama client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl OllamaConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = match env::var("OLLAMA_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Configuration(format!("OLLAMA_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self { host, model, timeout_secs };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration with explicit host and model
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.model.trim().is_empty() {
            return Err(Error::Configuration("OLLAMA_MODEL must not be empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Configuration("OLLAMA_TIMEOUT_SECS must be positive".to_string()));
        }
        Ok(())
    }

    /// Parsed server address
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.host)
            .map_err(|e| Error::Configuration(format!("Invalid OLLAMA_HOST '{}': {}", self.host, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::Configuration(format!("Unsupported OLLAMA_HOST scheme: {}", other))),
        }
    }

    /// Full URL of an API path such as `api/generate`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = self.base_url()?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|e| Error::Configuration(format!("Invalid endpoint '{}': {}", path, e)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
