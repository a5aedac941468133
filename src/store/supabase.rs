use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value as JsonValue;

use super::{ContextStore, StoreError, MESSAGES_TABLE};
use crate::config::ConfigError;
use crate::models::message::{Message, NewMessage};

/// Supabase table access over the PostgREST endpoint. Rows travel as plain
/// JSON; reference tables have no schema on our side.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: String, api_key: String) -> Result<Self, ConfigError> {
        if base_url.trim().is_empty() {
            return Err(ConfigError::MissingCredential("SUPABASE_URL"));
        }
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("SUPABASE_KEY"));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn fetch_rows(&self, table: &str) -> Result<Vec<JsonValue>, StoreError> {
        let resp = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::Rejected { status, body });
        }

        // PostgREST renders an empty result set as [] but a missing body or
        // null still means "no rows" to callers.
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(trimmed)?)
    }
}

#[async_trait]
impl ContextStore for SupabaseStore {
    async fn insert_message(
        &self,
        username: &str,
        message: &str,
    ) -> Result<Vec<Message>, StoreError> {
        if username.trim().is_empty() {
            return Err(StoreError::EmptyField("username"));
        }
        if message.trim().is_empty() {
            return Err(StoreError::EmptyField("message"));
        }

        let payload = NewMessage {
            username: username.to_string(),
            message: message.to_string(),
        };

        let resp = self
            .client
            .post(self.table_url(MESSAGES_TABLE))
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::Rejected { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        let rows = self.fetch_rows(MESSAGES_TABLE).await?;
        let messages = rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Message>, _>>()?;
        Ok(messages)
    }

    async fn list_reference(&self, table: &str) -> Result<Vec<JsonValue>, StoreError> {
        self.fetch_rows(table).await
    }
}
