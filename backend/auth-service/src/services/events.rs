/// Lifecycle event publishing over AMQP
///
/// Events are best-effort: the credential service logs and swallows publish
/// failures so a broker outage never blocks registration. The publisher
/// reconnects in the background with a fixed 5 second backoff and answers
/// `Unavailable` immediately while disconnected instead of queueing.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ExchangeDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use event_schema::{UserCreatedEvent, UserDeletedEvent};

use crate::error::{AuthError, Result};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_user_created(&self, event: &UserCreatedEvent) -> Result<()>;

    async fn publish_user_deleted(&self, event: &UserDeletedEvent) -> Result<()>;
}

struct AmqpLink {
    // The connection must outlive the channel; dropping it tears the
    // socket down.
    _connection: Connection,
    channel: Channel,
}

struct PublisherInner {
    url: String,
    exchange: String,
    link: Mutex<Option<AmqpLink>>,
    reconnecting: AtomicBool,
}

/// AMQP publisher bound to one durable topic exchange
#[derive(Clone)]
pub struct RabbitPublisher {
    inner: Arc<PublisherInner>,
}

impl RabbitPublisher {
    /// Connect and declare the durable topic exchange
    pub async fn connect(url: &str, exchange: &str) -> Result<Self> {
        let link = open_link(url, exchange)
            .await
            .map_err(|e| AuthError::Unavailable(format!("AMQP connect failed: {}", e)))?;

        info!(exchange = %exchange, "AMQP publisher connected");

        Ok(Self {
            inner: Arc::new(PublisherInner {
                url: url.to_string(),
                exchange: exchange.to_string(),
                link: Mutex::new(Some(link)),
                reconnecting: AtomicBool::new(false),
            }),
        })
    }

    #[cfg(test)]
    fn disconnected(exchange: &str) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                url: "amqp://unreachable/".to_string(),
                exchange: exchange.to_string(),
                link: Mutex::new(None),
                reconnecting: AtomicBool::new(true),
            }),
        }
    }

    async fn publish(&self, routing_key: &str, payload: &[u8]) -> Result<()> {
        let mut guard = self.inner.link.lock().await;

        let Some(link) = guard.as_ref() else {
            self.spawn_reconnect();
            return Err(AuthError::Unavailable(
                "AMQP publisher is reconnecting".to_string(),
            ));
        };

        let result = link
            .channel
            .basic_publish(
                &self.inner.exchange,
                routing_key,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    // persistent delivery, survives broker restart
                    .with_delivery_mode(2),
            )
            .await;

        match result {
            Ok(_confirm) => Ok(()),
            Err(e) => {
                // Drop the broken link so later publishes fail fast while
                // the background loop rebuilds it.
                *guard = None;
                drop(guard);
                self.spawn_reconnect();
                Err(AuthError::Unavailable(format!("AMQP publish failed: {}", e)))
            }
        }
    }

    fn spawn_reconnect(&self) {
        if self.inner.reconnecting.swap(true, Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(RECONNECT_DELAY).await;
                match open_link(&inner.url, &inner.exchange).await {
                    Ok(link) => {
                        *inner.link.lock().await = Some(link);
                        inner.reconnecting.store(false, Ordering::SeqCst);
                        info!(exchange = %inner.exchange, "AMQP publisher reconnected");
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "AMQP reconnect failed, retrying in 5s");
                    }
                }
            }
        });
    }
}

async fn open_link(url: &str, exchange: &str) -> std::result::Result<AmqpLink, lapin::Error> {
    let connection = Connection::connect(url, ConnectionProperties::default()).await?;
    let channel = connection.create_channel().await?;

    channel
        .exchange_declare(
            exchange,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    Ok(AmqpLink {
        _connection: connection,
        channel,
    })
}

#[async_trait]
impl EventPublisher for RabbitPublisher {
    async fn publish_user_created(&self, event: &UserCreatedEvent) -> Result<()> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| AuthError::Internal(format!("Event serialization failed: {}", e)))?;
        self.publish(event.routing_key(), &payload).await
    }

    async fn publish_user_deleted(&self, event: &UserDeletedEvent) -> Result<()> {
        let payload = serde_json::to_vec(event)
            .map_err(|e| AuthError::Internal(format!("Event serialization failed: {}", e)))?;
        self.publish(event.routing_key(), &payload).await
    }
}
