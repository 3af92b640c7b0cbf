use crate::entities::{SqliteStore, dao::User, parse_timestamp};
use std::future::Future;

pub trait UserStore: Send + Sync + 'static {
    /// Mint a new user identity.
    fn create_user(&self) -> impl Future<Output = Result<User, sqlx::Error>> + Send;
    fn get_user(&self, id: i64) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

impl UserStore for SqliteStore {
    async fn create_user(&self) -> Result<User, sqlx::Error> {
        let (id, created_at): (i64, String) =
            sqlx::query_as("INSERT INTO users DEFAULT VALUES RETURNING id, created_at")
                .fetch_one(&self.pool)
                .await?;
        Ok(User {
            id,
            created_at: parse_timestamp(&created_at),
        })
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, created_at FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, created_at)| User {
            id,
            created_at: parse_timestamp(&created_at),
        }))
    }
}
