//! Ollama integration for AgriSage
//!
//! This crate provides the Ollama implementation of the LLMProvider trait.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::OllamaClient;
pub use config::OllamaConfig;

// Re-export core types for convenience
pub use agri_core::{Error, GenerationConfig, GenerationResult, LLMProvider, Result};
