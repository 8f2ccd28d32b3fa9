/// JWT minting and validation (HS256)
///
/// The codec owns its keys; there are no process-global key cells. Build one
/// from the configured secret at startup and hand clones to whoever needs it.
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::User;

/// Token lifetime. Matches the session length clients are built around.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Why a token was rejected. Callers across the trust boundary see a uniform
/// "invalid token"; the distinction exists for logs and tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Bad token signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token missing required claim")]
    MissingClaim,
}

/// Claims carried by every issued token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 token codec
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MisconfiguredSecret);
        }

        // Pinning the algorithm rejects tokens signed under anything but
        // HS256, closing the algorithm-confusion hole.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Mint a signed token for a user, expiring in 24 hours
    pub fn mint(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                // serde failures mean the payload parsed as JSON but lacks a
                // claim our Claims struct requires
                ErrorKind::MissingRequiredClaim(_) | ErrorKind::Json(_) => TokenError::MissingClaim,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-secret-key-that-is-long-enough!";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET).unwrap()
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "user@example.com".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn rejects_empty_secret() {
        assert!(matches!(
            TokenCodec::new(""),
            Err(AuthError::MisconfiguredSecret)
        ));
    }

    #[test]
    fn mint_validate_round_trip() {
        let codec = codec();
        let user = test_user();

        let token = codec.mint(&user).unwrap();
        let claims = codec.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let forged = TokenCodec::new("a-completely-different-secret-value!")
            .unwrap()
            .mint(&test_user())
            .unwrap();

        assert_eq!(codec().validate(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn rejects_token_signed_with_other_algorithm() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "user@example.com".into(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(codec().validate(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "user@example.com".into(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec().validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn rejects_token_missing_claims() {
        #[derive(Serialize)]
        struct Partial {
            sub: Uuid,
            exp: i64,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial {
                sub: Uuid::new_v4(),
                exp: Utc::now().timestamp() + 3600,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec().validate(&token), Err(TokenError::MissingClaim));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            codec().validate("not.a.token"),
            Err(TokenError::Malformed)
        );
        assert_eq!(codec().validate(""), Err(TokenError::Malformed));
    }
}
