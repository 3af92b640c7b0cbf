use crate::entities::{SqliteStore, dao::Message, dao::Sender, parse_timestamp};
use std::future::Future;

/// `(id, user_id, sender, content, created_at)` as stored.
type MessageRow = (i64, i64, String, String, String);

pub trait MessageStore: Send + Sync + 'static {
    /// Persist a message; storage assigns `id` and `created_at`.
    fn append_message(
        &self,
        user_id: i64,
        sender: Sender,
        content: &str,
    ) -> impl Future<Output = Result<Message, sqlx::Error>> + Send;

    /// The newest message for `user_id`, if any.
    fn latest_message(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Option<Message>, sqlx::Error>> + Send;

    /// Up to `limit` messages for `user_id`, newest first.
    ///
    /// When `before_id` is set only messages with `id < before_id` qualify.
    fn list_recent_messages(
        &self,
        user_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Message>, sqlx::Error>> + Send;
}

impl MessageStore for SqliteStore {
    async fn append_message(
        &self,
        user_id: i64,
        sender: Sender,
        content: &str,
    ) -> Result<Message, sqlx::Error> {
        let row: MessageRow = sqlx::query_as(
            "INSERT INTO messages (user_id, sender, content) VALUES (?1, ?2, ?3) \
             RETURNING id, user_id, sender, content, created_at",
        )
        .bind(user_id)
        .bind(sender.as_ref())
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        message_from_row(row)
    }

    async fn latest_message(&self, user_id: i64) -> Result<Option<Message>, sqlx::Error> {
        let row: Option<MessageRow> = sqlx::query_as(
            "SELECT id, user_id, sender, content, created_at \
             FROM messages WHERE user_id = ?1 ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(message_from_row).transpose()
    }

    async fn list_recent_messages(
        &self,
        user_id: i64,
        before_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let rows: Vec<MessageRow> = if let Some(before) = before_id {
            sqlx::query_as(
                "SELECT id, user_id, sender, content, created_at \
                 FROM messages WHERE user_id = ?1 AND id < ?2 ORDER BY id DESC LIMIT ?3",
            )
            .bind(user_id)
            .bind(before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT id, user_id, sender, content, created_at \
                 FROM messages WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };
        rows.into_iter().map(message_from_row).collect()
    }
}

fn message_from_row(
    (id, user_id, sender, content, created_at): MessageRow,
) -> Result<Message, sqlx::Error> {
    let sender = sender
        .parse::<Sender>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(Message {
        id,
        user_id,
        sender,
        content,
        created_at: parse_timestamp(&created_at),
    })
}
