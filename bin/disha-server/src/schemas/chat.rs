use chrono::SecondsFormat;
use disha_app_core::Message;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChatInitRequest {
    /// Omit to start a new conversation.
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageRequest {
    pub user_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub id: i64,
    /// `"user"` or `"assistant"`.
    pub sender: String,
    pub content: String,
    /// RFC 3339, UTC.
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatInitData {
    pub user_id: i64,
    pub message: MessageDto,
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender: m.sender.to_string(),
            content: m.content,
            created_at: m.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
