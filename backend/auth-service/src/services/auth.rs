/// Credential service: registration, login, token validation
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use event_schema::{UserCreatedEvent, UserDeletedEvent};

use crate::error::{AuthError, Result};
use crate::models::User;
use crate::security::token::{Claims, TokenCodec, TokenError};
use crate::security::{hash_password, verify_password};
use crate::services::events::EventPublisher;
use crate::services::store::UserStore;
use crate::validators;

/// Business logic behind the gRPC trust boundary.
///
/// Storage and event publishing sit behind capability traits; the token
/// codec is owned directly since it has no I/O.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    publisher: Option<Arc<dyn EventPublisher>>,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        publisher: Option<Arc<dyn EventPublisher>>,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            store,
            publisher,
            tokens,
        }
    }

    /// Register a new account.
    ///
    /// The returned user has its password hash cleared. Event publishing is
    /// best-effort: a broker failure is logged and swallowed, registration
    /// has already committed.
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        if !validators::validate_email(email) {
            return Err(AuthError::InvalidEmail(email.to_string()));
        }
        if let Some(reason) = validators::password_weakness(password) {
            return Err(AuthError::WeakPassword(reason.to_string()));
        }

        // Fast-path check for a friendly error; the unique index on insert
        // is what actually decides races.
        if self.store.exists(email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(password)?;
        let user = self.store.insert(email, &password_hash).await?;

        info!(user_id = %user.id, "User registered");

        if let Some(publisher) = &self.publisher {
            let event = UserCreatedEvent {
                user_id: user.id,
                email: user.email.clone(),
            };
            if let Err(e) = publisher.publish_user_created(&event).await {
                warn!(user_id = %user.id, error = %e, "Failed to publish user.created event");
            }
        }

        Ok(user.redacted())
    }

    /// Verify credentials and mint a token.
    ///
    /// Unknown email and wrong password collapse into the same error so the
    /// response does not reveal which accounts exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User)> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.mint(&user)?;
        info!(user_id = %user.id, "User logged in");

        Ok((token, user.redacted()))
    }

    /// Validate a token. Pure delegation to the codec: no I/O, no side
    /// effects, safe to call on every request.
    pub fn validate_token(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        self.tokens.validate(token)
    }

    /// Soft-delete an account and announce it, same swallow policy as
    /// registration.
    pub async fn delete_account(&self, id: Uuid) -> Result<()> {
        let user = self
            .store
            .soft_delete(id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        info!(user_id = %user.id, "User account deleted");

        if let Some(publisher) = &self.publisher {
            let event = UserDeletedEvent { user_id: user.id };
            if let Err(e) = publisher.publish_user_deleted(&event).await {
                warn!(user_id = %user.id, error = %e, "Failed to publish user.deleted event");
            }
        }

        Ok(())
    }
}
