/// AMQP consumer for user lifecycle events
///
/// Binds a durable queue to the user-events topic exchange and records a
/// notification per event. Acknowledgement is manual and per delivery:
/// malformed payloads are discarded (no requeue, they will never parse),
/// storage failures are requeued (transient), successful inserts are acked.
use std::time::Duration;

use futures_util::StreamExt;
use lapin::{
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions,
        ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
    },
    types::FieldTable,
    Channel, Connection, ConnectionProperties, ExchangeKind,
};
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use event_schema::{LifecycleEvent, USER_CREATED_KEY, USER_DELETED_KEY};

use crate::config::AmqpSettings;
use crate::db;
use crate::error::Result;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Outcome of handling one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Processed, remove from the queue
    Ack,
    /// Transient failure, redeliver later
    Requeue,
    /// Permanent failure, drop without redelivery
    Discard,
}

/// Handle one delivery and decide its acknowledgement
pub async fn handle_event(pool: &PgPool, routing_key: &str, payload: &[u8]) -> Action {
    let event = match LifecycleEvent::decode(routing_key, payload) {
        None => {
            warn!(routing_key = %routing_key, "Ignoring event with unknown routing key");
            return Action::Discard;
        }
        Some(Err(e)) => {
            // Will never parse no matter how often it is redelivered
            warn!(routing_key = %routing_key, error = %e, "Discarding malformed event payload");
            return Action::Discard;
        }
        Some(Ok(event)) => event,
    };

    let (user_id, kind, message) = notification_for(&event);

    match db::insert(pool, user_id, kind, &message).await {
        Ok(notification) => {
            info!(
                notification_id = notification.id,
                user_id = %user_id,
                kind = %kind,
                "Notification recorded"
            );
            Action::Ack
        }
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to record notification, requeueing");
            Action::Requeue
        }
    }
}

/// Map a lifecycle event to the notification it produces
fn notification_for(event: &LifecycleEvent) -> (Uuid, &'static str, String) {
    match event {
        LifecycleEvent::Created(e) => (
            e.user_id,
            "welcome",
            format!(
                "Welcome! Your account has been successfully created for email: {}",
                e.email
            ),
        ),
        LifecycleEvent::Deleted(e) => (
            e.user_id,
            "farewell",
            "Your account has been deleted. We're sorry to see you go.".to_string(),
        ),
    }
}

/// Long-running consumer with reconnect
pub struct EventConsumer {
    pool: PgPool,
    settings: AmqpSettings,
}

impl EventConsumer {
    pub fn new(pool: PgPool, settings: AmqpSettings) -> Self {
        Self { pool, settings }
    }

    /// Consume until the shutdown flag flips to true.
    ///
    /// Broker failures reconnect with a fixed 5 second backoff, re-declaring
    /// the durable topology each time.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            match self.consume_once(&mut shutdown).await {
                Ok(true) => return Ok(()),
                Ok(false) => warn!("AMQP delivery stream ended, reconnecting in 5s"),
                Err(e) => warn!(error = %e, "AMQP consumer failed, reconnecting in 5s"),
            }

            tokio::select! {
                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// One connection lifetime. Returns Ok(true) when shutdown was
    /// requested, Ok(false) when the stream ended and a reconnect is due.
    async fn consume_once(&self, shutdown: &mut watch::Receiver<bool>) -> Result<bool> {
        let connection =
            Connection::connect(&self.settings.url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        self.declare_topology(&channel).await?;

        let mut consumer = channel
            .basic_consume(
                &self.settings.queue,
                "notification-service",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        info!(queue = %self.settings.queue, "Consuming user lifecycle events");

        loop {
            tokio::select! {
                // In-flight deliveries finish inside the other arm; this one
                // only wins while we are waiting for the next delivery.
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested, stopping consumer");
                        return Ok(true);
                    }
                }
                delivery = consumer.next() => {
                    let Some(delivery) = delivery else {
                        return Ok(false);
                    };
                    let delivery = delivery?;

                    let action = handle_event(
                        &self.pool,
                        delivery.routing_key.as_str(),
                        &delivery.data,
                    )
                    .await;

                    match action {
                        Action::Ack => delivery.acker.ack(BasicAckOptions::default()).await?,
                        Action::Requeue => {
                            delivery
                                .acker
                                .nack(BasicNackOptions {
                                    requeue: true,
                                    ..Default::default()
                                })
                                .await?
                        }
                        Action::Discard => {
                            delivery
                                .acker
                                .nack(BasicNackOptions {
                                    requeue: false,
                                    ..Default::default()
                                })
                                .await?
                        }
                    }
                }
            }
        }
    }

    /// Declare the durable exchange, queue, and bindings. Idempotent, runs
    /// on every (re)connect.
    async fn declare_topology(&self, channel: &Channel) -> Result<()> {
        channel
            .exchange_declare(
                &self.settings.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        channel
            .queue_declare(
                &self.settings.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await?;

        for routing_key in [USER_CREATED_KEY, USER_DELETED_KEY] {
            channel
                .queue_bind(
                    &self.settings.queue,
                    &self.settings.exchange,
                    routing_key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await?;
        }

        channel
            .basic_qos(self.settings.prefetch, BasicQosOptions::default())
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_schema::UserCreatedEvent;

    // connect_lazy never opens a socket; inserts against it fail, which is
    // exactly what the requeue test needs.
    fn unreachable_pool() -> PgPool {
        PgPool::connect_lazy("postgres://nobody@localhost:1/nowhere").unwrap()
    }

    #[test]
    fn welcome_message_includes_email() {
        let event = LifecycleEvent::Created(UserCreatedEvent {
            user_id: Uuid::new_v4(),
            email: "user@example.com".into(),
        });

        let (_, kind, message) = notification_for(&event);
        assert_eq!(kind, "welcome");
        assert_eq!(
            message,
            "Welcome! Your account has been successfully created for email: user@example.com"
        );
    }

    #[test]
    fn farewell_message_for_deletion() {
        let id = Uuid::new_v4();
        let event = LifecycleEvent::Deleted(event_schema::UserDeletedEvent { user_id: id });

        let (user_id, kind, _) = notification_for(&event);
        assert_eq!(user_id, id);
        assert_eq!(kind, "farewell");
    }

    #[tokio::test]
    async fn malformed_payload_is_discarded() {
        let action = handle_event(&unreachable_pool(), USER_CREATED_KEY, b"not json").await;
        assert_eq!(action, Action::Discard);
    }

    #[tokio::test]
    async fn unknown_routing_key_is_discarded() {
        let action = handle_event(&unreachable_pool(), "user.renamed", b"{}").await;
        assert_eq!(action, Action::Discard);
    }

    #[tokio::test]
    async fn storage_failure_requeues() {
        let payload = serde_json::to_vec(&UserCreatedEvent {
            user_id: Uuid::new_v4(),
            email: "user@example.com".into(),
        })
        .unwrap();

        let action = handle_event(&unreachable_pool(), USER_CREATED_KEY, &payload).await;
        assert_eq!(action, Action::Requeue);
    }
}
