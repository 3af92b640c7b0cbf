use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single row in the `messages` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Storage-assigned, monotonically increasing per database.
    pub id: i64,
    pub user_id: i64,
    pub sender: Sender,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
