use chrono::{DateTime, Utc};

/// A row in the `users` table. Users carry no profile, only an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}
