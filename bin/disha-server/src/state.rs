//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use disha_app_core::SqliteStore;
use disha_app_core::services::{ChatService, HistoryService};

use crate::config::Config;

/// State shared across all HTTP handlers.
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Conversation orchestrator.
    pub chat: ChatService<SqliteStore>,
    /// Read-only history queries.
    pub history: HistoryService<SqliteStore>,
}

impl AppState {
    pub fn new(config: Config, chat: ChatService<SqliteStore>, store: Arc<SqliteStore>) -> Self {
        Self {
            config: Arc::new(config),
            chat,
            history: HistoryService::new(store),
        }
    }
}
