use thiserror::Error;
use tonic::{Code, Status};

use crate::security::token::TokenError;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Password exceeds 72 bytes")]
    PasswordTooLong,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("JWT secret is misconfigured")]
    MisconfiguredSecret,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Convert to gRPC Status for wire protocol.
    ///
    /// Only infrastructure faults should reach the wire as Status; the RPC
    /// handlers fold business failures into in-band response fields first.
    pub fn to_status(&self) -> Status {
        match self {
            AuthError::InvalidEmail(msg) => {
                Status::new(Code::InvalidArgument, format!("Invalid email: {}", msg))
            }
            AuthError::WeakPassword(msg) => {
                Status::new(Code::InvalidArgument, format!("Password too weak: {}", msg))
            }
            AuthError::PasswordTooLong => {
                Status::new(Code::InvalidArgument, "Password exceeds 72 bytes")
            }
            AuthError::EmailTaken => Status::new(Code::AlreadyExists, "Email already registered"),
            AuthError::InvalidCredentials | AuthError::Token(_) => {
                Status::new(Code::Unauthenticated, "Invalid credentials or token")
            }
            AuthError::Unavailable(_) => Status::new(Code::Unavailable, "Service unavailable"),
            AuthError::MisconfiguredSecret
            | AuthError::Database(_)
            | AuthError::Internal(_) => {
                // Don't leak internal details in production
                Status::new(Code::Internal, "Internal server error")
            }
        }
    }
}

// Conversions from external error types
impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        // The unique index on live emails is the authoritative duplicate check
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some("23505") {
                return AuthError::EmailTaken;
            }
        }
        tracing::error!("Database error: {}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<AuthError> for Status {
    fn from(err: AuthError) -> Self {
        err.to_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_client_codes() {
        assert_eq!(
            AuthError::EmailTaken.to_status().code(),
            Code::AlreadyExists
        );
        assert_eq!(
            AuthError::InvalidCredentials.to_status().code(),
            Code::Unauthenticated
        );
        assert_eq!(
            AuthError::PasswordTooLong.to_status().code(),
            Code::InvalidArgument
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let status = AuthError::Database("connection refused to 10.0.0.5".into()).to_status();
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "Internal server error");
    }
}
