use super::{ChatMessage, LLMConfig, LLMProvider, LLMResponse, LLM};
use crate::error::{DigestError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Provider for any OpenAI-compatible chat completions API
/// (Perplexity, OpenAI, LMStudio)
pub struct ChatCompletionsProvider {
    config: LLMConfig,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl ChatCompletionsProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.provider != LLMProvider::LMStudio && config.api_key.is_none() {
            return Err(DigestError::Configuration(format!(
                "{:?} API key required",
                config.provider
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let endpoint = config.resolved_endpoint();

        Ok(Self {
            config,
            endpoint,
            client,
        })
    }
}

/// Message to surface for a non-success upstream response
///
/// Prefers the `error.message` of the usual JSON error envelope and falls
/// back to the raw body.
fn upstream_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let message = match &json["error"] {
            Value::Object(error) => error.get("message").and_then(Value::as_str),
            Value::String(message) => Some(message.as_str()),
            _ => json["detail"].as_str(),
        };
        if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("Completion service returned {}", status)
    } else {
        body.to_string()
    }
}

#[async_trait]
impl LLM for ChatCompletionsProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to {:?} at {}", self.config.provider, self.endpoint);

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DigestError::Upstream(upstream_error_message(status, &text)));
        }

        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                DigestError::Upstream(format!("No response from {:?}", self.config.provider))
            })?
            .message
            .content;

        let tokens_used = chat_response.usage.map(|u| u.total_tokens);
        debug!("Completion received: {} chars, tokens={:?}", content.len(), tokens_used);

        Ok(LLMResponse {
            content,
            tokens_used,
        })
    }

    async fn is_available(&self) -> bool {
        match self.config.provider {
            LLMProvider::LMStudio => {
                let models_endpoint = self.endpoint.replace("/chat/completions", "/models");
                match self.client.get(&models_endpoint).send().await {
                    Ok(response) => response.status().is_success(),
                    Err(_) => false,
                }
            }
            // no free health endpoint on hosted providers
            _ => self.config.api_key.is_some(),
        }
    }

    fn provider_type(&self) -> LLMProvider {
        self.config.provider
    }
}
