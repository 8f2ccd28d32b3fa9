use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User model - core credential entity
///
/// `password_hash` never leaves the process: it is skipped on
/// serialization and cleared before the user is handed to RPC responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Copy with the credential digest blanked, safe for external surfaces.
    pub fn redacted(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}
