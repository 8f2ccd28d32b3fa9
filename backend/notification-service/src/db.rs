/// Notification database operations
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Notification;

/// Insert a notification in the 'pending' state
pub async fn insert(pool: &PgPool, user_id: Uuid, kind: &str, message: &str) -> Result<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, kind, message)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .bind(message)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}
