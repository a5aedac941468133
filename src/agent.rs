use log::{info, warn};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;
use crate::config::prompt::compose_chat_prompt;
use crate::config::ConfigError;
use crate::llm::chat::{new_client as new_chat_client, ChatClient};
use crate::llm::{GenerationError, LlmConfig, LlmType};
use crate::models::message::Message;
use crate::store::{
    initialize_context_store, ContextStore, StoreError, COMPANY_DETAILS_TABLE,
    COMPANY_LOCATIONS_TABLE, SERVICES_PRODUCTS_TABLE,
};

/// Username under which generated answers are written back to the store.
pub const AI_USERNAME: &str = "AI";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Holds the store and chat client and runs the per-request pipeline:
/// fetch reference context, compose the prompt, generate, persist the answer.
#[derive(Clone)]
pub struct ChatAgent {
    store: Arc<dyn ContextStore>,
    chat_client: Arc<dyn ChatClient>,
}

impl ChatAgent {
    pub fn new(store: Arc<dyn ContextStore>, chat_client: Arc<dyn ChatClient>) -> Self {
        Self { store, chat_client }
    }

    fn initialize_chat_client(args: &Args) -> Result<Arc<dyn ChatClient>, ConfigError> {
        let chat_llm_type: LlmType = args.chat_llm_type.parse()?;
        let chat_api_key = if !args.chat_api_key.is_empty() {
            Some(args.chat_api_key.clone())
        } else {
            None
        };
        let chat_config = LlmConfig {
            llm_type: chat_llm_type,
            base_url: args.chat_base_url.clone(),
            api_key: chat_api_key,
            completion_model: args.chat_model.clone(),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}",
            args.chat_llm_type,
            chat_client.get_model()
        );
        Ok(chat_client)
    }

    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let chat_client = Self::initialize_chat_client(args)?;
        let store = initialize_context_store(args)?;
        Ok(Self::new(store, chat_client))
    }

    pub async fn add_message(
        &self,
        username: &str,
        message: &str,
    ) -> Result<Vec<Message>, AgentError> {
        Ok(self.store.insert_message(username, message).await?)
    }

    pub async fn list_messages(&self) -> Result<Vec<Message>, AgentError> {
        Ok(self.store.list_messages().await?)
    }

    /// An unreachable reference table degrades to empty context instead of
    /// failing the whole chat request.
    async fn fetch_reference(&self, table: &str) -> Vec<JsonValue> {
        match self.store.list_reference(table).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    "Reference fetch for '{}' failed, continuing with empty context: {}",
                    table, e
                );
                Vec::new()
            }
        }
    }

    pub async fn chat(&self, message: &str) -> Result<String, AgentError> {
        let details = self.fetch_reference(COMPANY_DETAILS_TABLE).await;
        let locations = self.fetch_reference(COMPANY_LOCATIONS_TABLE).await;
        let products = self.fetch_reference(SERVICES_PRODUCTS_TABLE).await;

        let prompt = compose_chat_prompt(message, &details, &locations, &products);
        let completion = self.chat_client.complete(&prompt).await?;
        let answer = completion.response;

        // The answer must be on record before it is returned; a failed
        // write fails the whole request.
        self.store.insert_message(AI_USERNAME, &answer).await?;

        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockChatClient, MockStore};
    use clap::Parser;
    use serde_json::json;

    #[tokio::test]
    async fn chat_persists_the_answer_under_the_ai_username() {
        let store = Arc::new(MockStore::default());
        let client = Arc::new(MockChatClient::replying(
            "Sustainability is meeting present needs.",
        ));
        let agent = ChatAgent::new(store.clone(), client);

        let answer = agent.chat("What is sustainability?").await.unwrap();
        assert_eq!(answer, "Sustainability is meeting present needs.");

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].0, AI_USERNAME);
        assert_eq!(inserted[0].1, "Sustainability is meeting present needs.");
    }

    #[tokio::test]
    async fn generation_failure_persists_nothing() {
        let store = Arc::new(MockStore::default());
        let client = Arc::new(MockChatClient::failing());
        let agent = ChatAgent::new(store.clone(), client);

        let err = agent.chat("What is EUDR?").await.unwrap_err();
        assert!(matches!(err, AgentError::Generation(_)));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_reference_tables_degrade_to_empty_context() {
        let store = Arc::new(MockStore {
            fail_references: true,
            ..MockStore::default()
        });
        let client = Arc::new(MockChatClient::replying("answer"));
        let agent = ChatAgent::new(store, client.clone());

        agent.chat("What is EUDR?").await.unwrap();

        let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Company Details: []"));
        assert!(prompt.contains("Company Locations: []"));
        assert!(prompt.contains("Products & Services: []"));
    }

    #[tokio::test]
    async fn reference_rows_reach_the_prompt() {
        let store = Arc::new(MockStore {
            reference_rows: vec![json!({"name": "Acme"})],
            ..MockStore::default()
        });
        let client = Arc::new(MockChatClient::replying("answer"));
        let agent = ChatAgent::new(store, client.clone());

        agent.chat("What is EUDR?").await.unwrap();

        let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains(r#"[{"name":"Acme"}]"#));
        assert!(prompt.contains("User Question: What is EUDR?"));
    }

    #[test]
    fn missing_chat_credential_refuses_to_construct() {
        let args = Args::parse_from([
            "sustain-agent",
            "--chat-llm-type",
            "gemini",
            "--chat-api-key",
            "",
            "--supabase-url",
            "http://localhost:54321",
            "--supabase-key",
            "service-key",
        ]);

        let err = ChatAgent::from_args(&args).err().unwrap();
        assert!(matches!(err, ConfigError::MissingCredential("CHAT_API_KEY")));
    }

    #[tokio::test]
    async fn persistence_failure_fails_the_chat() {
        let store = Arc::new(MockStore {
            fail_inserts: true,
            ..MockStore::default()
        });
        let client = Arc::new(MockChatClient::replying("answer"));
        let agent = ChatAgent::new(store, client);

        let err = agent.chat("What is EUDR?").await.unwrap_err();
        assert!(matches!(err, AgentError::Store(_)));
    }
}
