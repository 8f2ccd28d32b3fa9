/// Storage capability behind the credential service
///
/// The trait is deliberately narrow: the service only ever needs these four
/// operations, and the seam lets tests swap in a mock instead of a database.
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::models::User;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fast-path duplicate check; the insert's unique index is authoritative
    async fn exists(&self, email: &str) -> Result<bool>;

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns the affected row, or `None` when no live account matched
    async fn soft_delete(&self, id: Uuid) -> Result<Option<User>>;
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn exists(&self, email: &str) -> Result<bool> {
        db::users::email_exists(&self.pool, email).await
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User> {
        db::users::insert(&self.pool, email, password_hash).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        db::users::find_by_email(&self.pool, email).await
    }

    async fn soft_delete(&self, id: Uuid) -> Result<Option<User>> {
        db::users::soft_delete(&self.pool, id).await
    }
}
