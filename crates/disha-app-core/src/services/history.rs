//! Message history: backward pagination and the model context window.

use std::sync::Arc;

use tracing::debug;

use crate::entities::{Message, MessageStore};
use crate::error::CoreError;
use crate::llm::{Role, Turn};

/// Number of stored messages fetched as model context for one turn.
pub const CONTEXT_WINDOW: u32 = 10;

/// One page of history, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub messages: Vec<Message>,
    /// `true` when older messages exist beyond this page.
    pub has_more: bool,
}

/// Read-only queries over a user's stored messages.
#[derive(Debug)]
pub struct HistoryService<S> {
    store: Arc<S>,
}

impl<S: MessageStore> HistoryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The `limit` most recent messages older than `before_id` (or overall).
    ///
    /// Fetches newest-first with one extra probe row, derives `has_more`
    /// from the probe, drops it, then reverses to ascending order. The limit
    /// is not clamped here; callers bound it.
    pub async fn get_history(
        &self,
        user_id: i64,
        before_id: Option<i64>,
        limit: u32,
    ) -> Result<HistoryPage, CoreError> {
        let mut messages = self
            .store
            .list_recent_messages(user_id, before_id, i64::from(limit) + 1)
            .await?;

        let has_more = messages.len() > limit as usize;
        messages.truncate(limit as usize);
        messages.reverse();

        debug!(user_id, ?before_id, limit, returned = messages.len(), has_more, "history page");
        Ok(HistoryPage { messages, has_more })
    }

    /// The last `limit` messages for `user_id`, oldest first.
    pub async fn get_context_messages(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<Message>, CoreError> {
        let mut messages = self
            .store
            .list_recent_messages(user_id, None, i64::from(limit))
            .await?;
        messages.sort_by_key(|m| m.id);
        Ok(messages)
    }
}

/// Turn a context window into model turns around the `current` message.
///
/// `current` is removed from wherever it sits in `window` and appended once
/// as the final user turn.
pub fn context_turns(window: &[Message], current: &Message) -> Vec<Turn> {
    window
        .iter()
        .filter(|m| m.id != current.id)
        .map(|m| Turn {
            role: Role::from(m.sender),
            text: m.content.clone(),
        })
        .chain(std::iter::once(Turn::user(current.content.clone())))
        .collect()
}
