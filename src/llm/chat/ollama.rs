use async_trait::async_trait;
use log::info;

use super::{ChatClient, CompletionResponse};
use crate::config::ConfigError;
use crate::llm::{GenerationError, LlmConfig};
use rllm::builder::{LLMBackend, LLMBuilder};
use rllm::chat::{ChatMessage, ChatRole, MessageType};
use rllm::LLMProvider;

/// Local Ollama daemon. No API key required.
pub struct OllamaChatClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    base_url: String,
}

impl OllamaChatClient {
    pub fn new(model: Option<String>, base_url: Option<String>) -> Result<Self, ConfigError> {
        let chat_model = model.unwrap_or_else(|| "llama3".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".to_string());

        let llm_provider = LLMBuilder::new()
            .backend(LLMBackend::Ollama)
            .base_url(&url)
            .model(&chat_model)
            .stream(false)
            .build()
            .map_err(|e| ConfigError::Provider(e.to_string()))?;

        Ok(Self {
            llm: llm_provider,
            model: chat_model,
            base_url: url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        Self::new(config.completion_model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for OllamaChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, GenerationError> {
        let messages = vec![ChatMessage {
            role: ChatRole::User,
            content: prompt.to_string(),
            message_type: MessageType::Text,
        }];
        info!(
            "OllamaChatClient::complete() → model={} base_url={}",
            self.model, self.base_url
        );
        let resp = self
            .llm
            .chat(&messages)
            .await
            .map_err(|e| GenerationError::Completion(e.to_string()))?;
        let text = resp
            .text()
            .map(|s| s.to_string())
            .unwrap_or_else(|| resp.to_string());
        Ok(CompletionResponse {
            response: text.trim().to_string(),
        })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
