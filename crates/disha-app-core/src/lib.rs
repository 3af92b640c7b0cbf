//! Core of the Disha chat backend.
//!
//! Everything that does not depend on the HTTP transport lives here:
//! - [`entities`]: message/user records and their SQLite-backed stores
//! - [`services`]: keyword guidance lookup, history pagination, and the
//!   conversation orchestrator that ties them to the language model
//! - [`llm`]: the [`llm::ChatModel`] seam and its Gemini implementation
//! - [`prompt`]: loading of the base system prompt

pub mod entities;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod services;

pub use entities::{Message, MessageStore, PoolSettings, Sender, SqliteStore, User, UserStore};
pub use error::CoreError;
