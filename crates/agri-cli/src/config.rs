//! Application configuration

use agri_core::{Error, Result};
use agri_ollama::OllamaConfig;
use agri_rag::CascadeConfig;
use serde::Serialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_KNOWLEDGE_DIR: &str = "knowledge_base";
pub const DEFAULT_LEARNED_STORE: &str = "vector_db/learned_kb.json";

/// Settings for one run of the binary
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Directory scanned by the document indexer
    pub knowledge_dir: PathBuf,
    /// JSON file backing the learning store
    pub learned_store: PathBuf,
    pub use_llm: bool,
    pub ollama: OllamaConfig,
    pub cascade: CascadeConfig,
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Configuration(format!("{} must be true or false, got '{}'", name, other))),
    }
}

impl AppConfig {
    /// Create configuration from `.env` and environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let ollama = OllamaConfig::from_env()?;
        Self::from_lookup(|key| env::var(key).ok(), ollama)
    }

    /// Build configuration from any key lookup
    pub fn from_lookup<F>(lookup: F, ollama: OllamaConfig) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let knowledge_dir = lookup("AGRI_KNOWLEDGE_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_KNOWLEDGE_DIR.to_string());
        let learned_store = lookup("AGRI_LEARNED_STORE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEARNED_STORE.to_string());
        let use_llm = match lookup("AGRI_USE_LLM") {
            Some(raw) => parse_flag("AGRI_USE_LLM", &raw)?,
            None => true,
        };

        let cascade = CascadeConfig {
            use_generation: use_llm,
            ..CascadeConfig::default()
        };

        Ok(Self {
            knowledge_dir: PathBuf::from(knowledge_dir),
            learned_store: PathBuf::from(learned_store),
            use_llm,
            ollama,
            cascade,
        })
    }

    /// Turn generation off regardless of the environment
    pub fn without_llm(mut self) -> Self {
        self.use_llm = false;
        self.cascade.use_generation = false;
        self
    }
}
