use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload for inserting a chat message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewMessage {
    pub username: String,
    pub message: String,
}

/// A chat message as returned by the store. `id` and `created_at` are
/// assigned by the store and absent from insert payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
