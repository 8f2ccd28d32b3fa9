/// User database operations for auth-service
use crate::error::Result;
use crate::models::User;
use sqlx::PgPool;
use uuid::Uuid;

/// Check whether a live (non-deleted) account holds this email
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool> {
    let exists: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND deleted_at IS NULL)",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(exists.0)
}

/// Insert a new user row.
///
/// The partial unique index on live emails makes this the authoritative
/// duplicate check; a 23505 violation surfaces as `AuthError::EmailTaken`
/// through the `From<sqlx::Error>` conversion.
pub async fn insert(pool: &PgPool, email: &str, password_hash: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Find user by email (excluding soft-deleted users)
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL")
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(user)
}

/// Soft-delete a user, returning the affected row if one was live
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
