use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the core services.
///
/// Model failures are deliberately absent: the orchestrator downgrades them
/// to a fallback reply instead of failing the turn.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Pending migrations could not be applied at startup.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The caller referenced a user that was never created.
    #[error("user {0} not found")]
    UserNotFound(i64),

    /// The base system prompt could not be read.
    #[error("failed to read system prompt {}: {source}", .path.display())]
    Prompt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
