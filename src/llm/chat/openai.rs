use async_trait::async_trait;
use log::info;

use super::{ChatClient, CompletionResponse};
use crate::config::ConfigError;
use crate::llm::{GenerationError, LlmConfig};
use rllm::builder::{LLMBackend, LLMBuilder};
use rllm::chat::{ChatMessage, ChatRole, MessageType};
use rllm::LLMProvider;

pub struct OpenAIChatClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    base_url: Option<String>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let chat_model = model.unwrap_or_else(|| "gpt-4o".to_string());

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::OpenAI)
            .api_key(api_key)
            .model(&chat_model)
            .stream(false);

        if let Some(url) = &base_url {
            builder = builder.base_url(url);
        }

        let llm_provider = builder
            .build()
            .map_err(|e| ConfigError::Provider(e.to_string()))?;

        Ok(Self {
            llm: llm_provider,
            model: chat_model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ConfigError::MissingCredential("CHAT_API_KEY"))?;

        Self::new(api_key, config.completion_model.clone(), config.base_url.clone())
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, GenerationError> {
        let messages = vec![ChatMessage {
            role: ChatRole::User,
            content: prompt.to_string(),
            message_type: MessageType::Text,
        }];
        info!(
            "OpenAIChatClient::complete() → model={} base_url={:?}",
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
