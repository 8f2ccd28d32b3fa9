use thiserror::Error;

pub type Result<T> = std::result::Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    #[error("Malformed event payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}
