//! LLM provider trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub stop_sequences: Vec<String>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "llama3".to_string(),
            max_tokens: 500,
            temperature: Some(0.7),
            top_p: Some(0.95),
            stop_sequences: vec!["QUESTION:".to_string()],
            timeout: Duration::from_secs(120),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers (Ollama, hosted APIs, test fakes)
///
/// This is the generative-text capability consumed by the question cascade.
/// A failed call is reported as `Err`; the caller decides what a failure
/// means. Retry policy, if any, lives inside the implementation.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Connect to / probe the backend
    async fn connect(&mut self) -> Result<()>;

    /// Generate text using the provider's default configuration
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.model_id().to_string(),
            ..Default::default()
        };
        self.generate_with_config(prompt, &config).await
    }

    /// Generate text with custom configuration
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
