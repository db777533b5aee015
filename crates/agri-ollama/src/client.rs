//! Ollama HTTP client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info};

use agri_core::{Error, GenerationConfig, GenerationResult, LLMProvider, Result};

use crate::config::OllamaConfig;

/// Ollama client
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
    current_model: String,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// Strip an echoed "ANSWER:" lead-in and anything after a stray "QUESTION:"
fn clean_response(raw: &str) -> String {
    let mut answer = raw.trim();
    if let Some(rest) = answer.strip_prefix("ANSWER:") {
        answer = rest.trim_start();
    }
    if let Some(pos) = answer.find("QUESTION:") {
        answer = &answer[..pos];
    }
    answer.trim().to_string()
}

impl OllamaClient {
    /// Create a new client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            current_model: config.model.clone(),
            config,
            client,
        })
    }

    /// Create a new client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OllamaConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.current_model = model_id.into();
        self
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    async fn perform_generation(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationResult> {
        let request_body = GenerateRequest {
            model: &config.model_id,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: config.max_tokens,
                temperature: config.temperature,
                top_p: config.top_p,
                stop: config.stop_sequences.clone(),
            },
        };

        let url = self.config.endpoint("api/generate")?;
        debug!(url = %url, model = %config.model_id, "Sending generation request");

        let response = self
            .client
            .post(url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::LLMProvider(format!(
                "Ollama request failed with status {}: {}",
                status, error_text
            )));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let text = clean_response(&data.response);
        if text.is_empty() {
            return Err(Error::LLMProvider("Empty response from Ollama".to_string()));
        }

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used: data.eval_count,
        })
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn connect(&mut self) -> Result<()> {
        let url = self.config.endpoint("api/tags")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::LLMProvider(format!(
                "Ollama is not reachable: {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let wanted = self.current_model.as_str();
        let available = tags
            .models
            .iter()
            .any(|m| m.name == wanted || m.name.split(':').next() == Some(wanted));
        if !available {
            return Err(Error::LLMProvider(format!(
                "Model '{}' is not pulled on {}",
                wanted, self.config.host
            )));
        }

        info!(host = %self.config.host, model = %wanted, "Connected to Ollama");
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.current_model.clone(),
            timeout: self.config.timeout(),
            ..Default::default()
        };
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(&self, prompt: &str, config: &GenerationConfig) -> Result<GenerationResult> {
        match timeout(config.timeout, self.perform_generation(prompt, config)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout("Request timed out".to_string())),
        }
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}
