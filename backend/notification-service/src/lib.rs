/// Notification Service Library
///
/// Consumes user lifecycle events from the broker and records notifications
/// for later delivery.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `consumer`: AMQP consumer loop and per-delivery handling
/// - `db`: Database repository (notifications)
/// - `error`: Error types
/// - `models`: Data models
pub mod config;
pub mod consumer;
pub mod db;
pub mod error;
pub mod models;

pub use error::{NotificationError, Result};
