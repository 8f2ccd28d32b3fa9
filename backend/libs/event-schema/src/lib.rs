/// Event schema registry for the user-events exchange
///
/// Defines the wire format of identity lifecycle events shared between
/// auth-service (publisher) and notification-service (consumer). The routing
/// key on the topic exchange equals the event name, and payloads are plain
/// JSON objects with snake_case fields.
///
/// Changing a field name here is a wire-format break for every consumer;
/// additions must be optional.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Routing key for user creation events
pub const USER_CREATED_KEY: &str = "user.created";

/// Routing key for user deletion events
pub const USER_DELETED_KEY: &str = "user.deleted";

/// Published after a new identity has been committed to storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreatedEvent {
    pub user_id: Uuid,
    pub email: String,
}

impl UserCreatedEvent {
    pub fn routing_key(&self) -> &'static str {
        USER_CREATED_KEY
    }
}

/// Published after an identity has been soft-deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeletedEvent {
    pub user_id: Uuid,
}

impl UserDeletedEvent {
    pub fn routing_key(&self) -> &'static str {
        USER_DELETED_KEY
    }
}

/// A lifecycle fact together with its routing key, for consumers that
/// dispatch on the key of the incoming delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created(UserCreatedEvent),
    Deleted(UserDeletedEvent),
}

impl LifecycleEvent {
    /// Decode a delivery payload based on its routing key.
    ///
    /// Returns `None` for routing keys this schema does not know about;
    /// returns a JSON error for known keys with malformed payloads.
    pub fn decode(routing_key: &str, payload: &[u8]) -> Option<serde_json::Result<Self>> {
        match routing_key {
            USER_CREATED_KEY => Some(serde_json::from_slice(payload).map(Self::Created)),
            USER_DELETED_KEY => Some(serde_json::from_slice(payload).map(Self::Deleted)),
            _ => None,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Created(e) => e.user_id,
            Self::Deleted(e) => e.user_id,
        }
    }

    pub fn routing_key(&self) -> &'static str {
        match self {
            Self::Created(e) => e.routing_key(),
            Self::Deleted(e) => e.routing_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_created_wire_format() {
        let event = UserCreatedEvent {
            user_id: Uuid::nil(),
            email: "a@x.com".to_string(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "user_id": "00000000-0000-0000-0000-000000000000",
                "email": "a@x.com",
            })
        );
    }

    #[test]
    fn user_deleted_wire_format() {
        let event = UserDeletedEvent {
            user_id: Uuid::nil(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({ "user_id": "00000000-0000-0000-0000-000000000000" })
        );
    }

    #[test]
    fn decode_dispatches_on_routing_key() {
        let id = Uuid::new_v4();
        let payload = serde_json::to_vec(&UserCreatedEvent {
            user_id: id,
            email: "a@x.com".into(),
        })
        .unwrap();

        let event = LifecycleEvent::decode(USER_CREATED_KEY, &payload)
            .expect("known routing key")
            .expect("valid payload");
        assert_eq!(event.user_id(), id);
        assert_eq!(event.routing_key(), "user.created");
    }

    #[test]
    fn decode_rejects_malformed_payload() {
        let result = LifecycleEvent::decode(USER_CREATED_KEY, b"not json");
        assert!(matches!(result, Some(Err(_))));
    }

    #[test]
    fn decode_ignores_unknown_routing_key() {
        assert!(LifecycleEvent::decode("user.renamed", b"{}").is_none());
    }

    #[test]
    fn deleted_event_tolerates_extra_fields() {
        // A deleted payload produced by an older publisher that still
        // includes the email must remain consumable.
        let payload = br#"{"user_id":"6dfb8c9e-6a51-4f74-9ee1-87a07ba55ab4","email":"a@x.com"}"#;
        let event = LifecycleEvent::decode(USER_DELETED_KEY, payload)
            .unwrap()
            .unwrap();
        assert!(matches!(event, LifecycleEvent::Deleted(_)));
    }
}
