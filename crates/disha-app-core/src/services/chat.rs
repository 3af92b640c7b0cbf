//! Conversation orchestrator.
//!
//! One turn is a strictly sequential pipeline:
//! persist user message → system prompt (base + guidance) → context window →
//! model call → persist assistant reply. Each persist commits on its own; a
//! failure between the two leaves the user message without a reply.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::entities::{Message, MessageStore, Sender, UserStore};
use crate::error::CoreError;
use crate::llm::{ChatModel, Turn};
use crate::services::fallback;
use crate::services::history::{CONTEXT_WINDOW, HistoryService, context_turns};
use crate::services::protocol::relevant_protocols;

/// First message of every new conversation.
pub const GREETING: &str = "Hi! I'm Disha, your AI health coach 😊";

/// Append matched guidance to the base prompt under a `PROTOCOL CONTEXT` heading.
pub fn build_system_prompt(base: &str, user_message: &str) -> String {
    let protocols = relevant_protocols(user_message);
    if protocols.is_empty() {
        return base.to_owned();
    }
    format!(
        "{base}\n\n# PROTOCOL CONTEXT\n\
         The user seems to be describing a symptom or situation. \
         Use the following medical protocols to guide your response if relevant:\n\
         {protocols}"
    )
}

pub struct ChatService<S> {
    store: Arc<S>,
    history: HistoryService<S>,
    model: Arc<dyn ChatModel>,
    system_prompt: Arc<str>,
}

impl<S: MessageStore + UserStore> ChatService<S> {
    pub fn new(store: Arc<S>, model: Arc<dyn ChatModel>, system_prompt: Arc<str>) -> Self {
        Self {
            history: HistoryService::new(Arc::clone(&store)),
            store,
            model,
            system_prompt,
        }
    }

    /// Resume a conversation or start a new one.
    ///
    /// A known user with at least one message gets its latest message back
    /// and nothing is written. Anyone else gets a fresh user id and a stored
    /// greeting.
    pub async fn init_chat(&self, user_id: Option<i64>) -> Result<(Message, i64), CoreError> {
        if let Some(id) = user_id {
            if let Some(latest) = self.store.latest_message(id).await? {
                info!(user_id = id, message_id = latest.id, "resuming conversation");
                return Ok((latest, id));
            }
        }

        let user = self.store.create_user().await?;
        let greeting = self
            .store
            .append_message(user.id, Sender::Assistant, GREETING)
            .await?;
        info!(user_id = user.id, requested = ?user_id, "started new conversation");
        Ok((greeting, user.id))
    }

    /// Store `text` from `user_id`, ask the model, store and return its reply.
    ///
    /// Blank input must be rejected by the caller. Model failures never
    /// fail the call; they become a fallback reply instead.
    pub async fn send_message(&self, user_id: i64, text: &str) -> Result<Message, CoreError> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(CoreError::UserNotFound(user_id));
        }

        let current = self.store.append_message(user_id, Sender::User, text).await?;

        let system_prompt = build_system_prompt(&self.system_prompt, text);
        let window = self
            .history
            .get_context_messages(user_id, CONTEXT_WINDOW)
            .await?;
        let turns = context_turns(&window, &current);

        let reply = self.generate_reply(user_id, &system_prompt, &turns).await;

        let stored = self
            .store
            .append_message(user_id, Sender::Assistant, &reply)
            .await?;
        info!(
            user_id,
            user_message_id = current.id,
            reply_id = stored.id,
            turns = turns.len(),
            "turn completed"
        );
        Ok(stored)
    }

    async fn generate_reply(&self, user_id: i64, system_prompt: &str, turns: &[Turn]) -> String {
        match self.model.generate(system_prompt, turns).await {
            Ok(reply) if !reply.text.is_empty() => reply.text,
            Ok(reply) => {
                warn!(user_id, finish_reason = ?reply.finish_reason, "model returned no text");
                fallback::reply_for_empty_output(reply.finish_reason.as_deref())
            }
            Err(e) => {
                error!(user_id, error = %e, "LLM error");
                fallback::reply_for_model_error(&e.to_string()).to_owned()
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
