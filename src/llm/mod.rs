pub mod extract;
pub mod prompt;
pub mod providers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// LLM provider types
///
/// All of them speak the OpenAI-compatible chat completions format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LLMProvider {
    Perplexity,
    OpenAI,
    LMStudio,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    /// Chat completions URL; the provider default is used when unset
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Replaces the built-in system prompt when set
    pub prompt_file: Option<PathBuf>,
}

impl LLMConfig {
    /// Defaults for a given provider
    pub fn for_provider(provider: LLMProvider) -> Self {
        let model = match provider {
            LLMProvider::Perplexity => "sonar",
            LLMProvider::OpenAI => "gpt-4o-mini",
            LLMProvider::LMStudio => "local-model",
        };

        Self {
            provider,
            endpoint: None,
            api_key: None,
            model: model.to_string(),
            max_tokens: 8192,
            temperature: 0.2,
            timeout_seconds: 180,
            prompt_file: None,
        }
    }

    /// Endpoint to post chat completions to
    pub fn resolved_endpoint(&self) -> String {
        if let Some(endpoint) = self.endpoint.as_ref().filter(|e| !e.trim().is_empty()) {
            return endpoint.clone();
        }

        match self.provider {
            LLMProvider::Perplexity => "https://api.perplexity.ai/chat/completions",
            LLMProvider::OpenAI => "https://api.openai.com/v1/chat/completions",
            LLMProvider::LMStudio => "http://localhost:1234/v1/chat/completions",
        }
        .to_string()
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::for_provider(LLMProvider::Perplexity)
    }
}

/// Chat message for LLM communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub tokens_used: Option<u32>,
}

/// Trait for LLM providers
#[async_trait]
pub trait LLM: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse>;
    async fn is_available(&self) -> bool;
    fn provider_type(&self) -> LLMProvider;
}

/// Create LLM instance based on configuration
pub fn create_llm(config: &LLMConfig) -> Result<Box<dyn LLM>> {
    Ok(Box::new(providers::ChatCompletionsProvider::new(config.clone())?))
}
