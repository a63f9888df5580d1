use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Login session. Only the SHA-256 digest of the bearer token is persisted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserSession {
    pub id: i64,
    pub user_id: i64,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl UserSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
