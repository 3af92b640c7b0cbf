//! Persistence layer.
//!
//! [`MessageStore`] and [`UserStore`] define the storage interface used by the
//! services. The default implementation is [`SqliteStore`]; to move to another
//! database, implement both traits for a new type and change the concrete type
//! held by the server state.
//!
//! All trait methods use `impl Future` in their signatures so no extra
//! `async-trait` crate is required at this seam.

pub mod dao;
pub mod message;
pub mod user;

pub use dao::{Message, Sender, User};
pub use message::MessageStore;
pub use user::UserStore;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::CoreError;

/// Connection-pool sizing for [`SqliteStore::connect`].
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
    /// Connections older than this are recycled.
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            acquire_timeout: Duration::from_secs(15),
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

/// SQLite-backed message and user store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g. `"sqlite://disha.db"`.
    pub async fn connect(url: &str, settings: PoolSettings) -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .max_lifetime(settings.max_lifetime)
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    /// Open a private in-memory database.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn connect_in_memory() -> Result<Self, CoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, CoreError> {
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to "now" on garbage.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw = %raw, error = %e, "failed to parse stored timestamp; using now");
        Utc::now()
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_timestamp_accepts_sqlite_format() {
        let ts = parse_timestamp("2025-03-01T10:15:30.250Z");
        assert_eq!(ts.to_rfc3339(), "2025-03-01T10:15:30.250+00:00");
    }

    #[tokio::test]
    async fn connect_file_database_runs_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("disha.db").display());
        let store = SqliteStore::connect(&url, PoolSettings::default())
            .await
            .unwrap();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'messages')",
        )
        .fetch_one(&store.pool)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }
}
