//! Chat-completions client for the configured language model.
//!
//! One synchronous (awaited) call per generation, `stream: false`. The
//! `ChatModel` trait is the seam the generator talks through so tests can
//! substitute a canned model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, Text2SqlError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Everything needed to reach the model, passed explicitly rather than read
/// from ambient context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    pub mode: String,
    /// Extra completion parameters (temperature, max_tokens, ...) merged
    /// into the request body.
    #[serde(default)]
    pub completion_params: serde_json::Map<String, serde_json::Value>,
    pub api_key: String,
    pub base_url: String,
}

impl ModelConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            mode: "chat".to_string(),
            completion_params: serde_json::Map::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the prompt messages and return the model's raw text reply.
    async fn chat(&self, config: &ModelConfig, messages: &[PromptMessage]) -> Result<String>;
}

pub struct LlmClient {
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for LlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn chat(&self, config: &ModelConfig, messages: &[PromptMessage]) -> Result<String> {
        if config.mode != "chat" {
            warn!("Model mode '{}' requested; only chat mode is supported", config.mode);
        }

        let mut body = serde_json::json!({
            "model": config.model,
            "messages": messages,
            "stream": false,
        });
        if let Some(obj) = body.as_object_mut() {
            for (k, v) in &config.completion_params {
                obj.insert(k.clone(), v.clone());
            }
        }

        debug!(
            "Calling {} model {} with {} messages",
            config.provider,
            config.model,
            messages.len()
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", config.base_url))
            .header("Authorization", format!("Bearer {}", config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Text2SqlError::Llm(format!("LLM API call failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Text2SqlError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Text2SqlError::Llm("No content in LLM response".to_string()))?;

        Ok(content.to_string())
    }
}
