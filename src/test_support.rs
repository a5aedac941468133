//! Mock store and chat client shared by the agent and HTTP tests.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Mutex;

use crate::llm::chat::{ChatClient, CompletionResponse};
use crate::llm::GenerationError;
use crate::models::message::Message;
use crate::store::{ContextStore, StoreError};

#[derive(Default)]
pub struct MockStore {
    pub inserted: Mutex<Vec<(String, String)>>,
    pub reference_rows: Vec<JsonValue>,
    pub fail_inserts: bool,
    pub fail_lists: bool,
    pub fail_references: bool,
}

impl MockStore {
    fn unreachable() -> StoreError {
        StoreError::Rejected {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "store unreachable".to_string(),
        }
    }
}

#[async_trait]
impl ContextStore for MockStore {
    async fn insert_message(
        &self,
        username: &str,
        message: &str,
    ) -> Result<Vec<Message>, StoreError> {
        if self.fail_inserts {
            return Err(Self::unreachable());
        }
        if username.trim().is_empty() {
            return Err(StoreError::EmptyField("username"));
        }
        if message.trim().is_empty() {
            return Err(StoreError::EmptyField("message"));
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push((username.to_string(), message.to_string()));
        Ok(vec![Message {
            id: Some(inserted.len() as i64),
            username: username.to_string(),
            message: message.to_string(),
            created_at: None,
        }])
    }

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        if self.fail_lists {
            return Err(Self::unreachable());
        }
        let inserted = self.inserted.lock().unwrap();
        Ok(inserted
            .iter()
            .enumerate()
            .map(|(i, (username, message))| Message {
                id: Some(i as i64 + 1),
                username: username.clone(),
                message: message.clone(),
                created_at: None,
            })
            .collect())
    }

    async fn list_reference(&self, _table: &str) -> Result<Vec<JsonValue>, StoreError> {
        if self.fail_references {
            return Err(Self::unreachable());
        }
        Ok(self.reference_rows.clone())
    }
}

pub struct MockChatClient {
    response: Option<String>,
    pub last_prompt: Mutex<Option<String>>,
}

impl MockChatClient {
    pub fn replying(text: &str) -> Self {
        Self {
            response: Some(text.to_string()),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            last_prompt: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, GenerationError> {
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.response {
            Some(text) => Ok(CompletionResponse {
                response: text.trim().to_string(),
            }),
            None => Err(GenerationError::Completion("model unreachable".to_string())),
        }
    }

    fn get_model(&self) -> String {
        "mock-model".to_string()
    }
}
