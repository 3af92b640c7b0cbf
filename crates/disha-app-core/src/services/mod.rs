pub mod chat;
pub mod fallback;
pub mod history;
pub mod protocol;

pub use chat::{ChatService, GREETING, build_system_prompt};
pub use history::{CONTEXT_WINDOW, HistoryPage, HistoryService};
pub use protocol::relevant_protocols;
