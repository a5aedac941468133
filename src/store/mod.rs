mod supabase;

use async_trait::async_trait;
use log::info;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

use crate::cli::Args;
use crate::config::ConfigError;
use crate::models::message::Message;

pub const MESSAGES_TABLE: &str = "messages";
pub const COMPANY_DETAILS_TABLE: &str = "company_details";
pub const COMPANY_LOCATIONS_TABLE: &str = "company_locations";
pub const SERVICES_PRODUCTS_TABLE: &str = "services_products";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store rejected request with status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to decode store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Remote table store. Every call is a single synchronous round trip;
/// no caching, no batching, no retries.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Appends one message record and returns the stored representation.
    async fn insert_message(
        &self,
        username: &str,
        message: &str,
    ) -> Result<Vec<Message>, StoreError>;

    /// Returns all message records in store-defined order.
    async fn list_messages(&self) -> Result<Vec<Message>, StoreError>;

    /// Returns all rows of one reference table. A table with no rows is an
    /// empty collection, not an error.
    async fn list_reference(&self, table: &str) -> Result<Vec<JsonValue>, StoreError>;
}

pub fn create_context_store(args: &Args) -> Result<Arc<dyn ContextStore>, ConfigError> {
    match args.store_type.to_lowercase().as_str() {
        "supabase" => {
            let store =
                supabase::SupabaseStore::new(args.supabase_url.clone(), args.supabase_key.clone())?;
            Ok(Arc::new(store))
        }
        other => Err(ConfigError::UnsupportedStore(other.to_string())),
    }
}

pub fn initialize_context_store(args: &Args) -> Result<Arc<dyn ContextStore>, ConfigError> {
    info!("Context store: {} at {}", args.store_type, args.supabase_url);
    create_context_store(args)
}
