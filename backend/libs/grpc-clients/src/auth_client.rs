use std::time::Duration;

use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tonic::Request;
use uuid::Uuid;

use crate::subs::auth::auth_service_client::AuthServiceClient;
use crate::subs::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, TokenRequest};

/// Token validation sits on the hot path of every authenticated request,
/// so it gets a hard deadline instead of the channel default.
const VALIDATE_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum AuthClientError {
    #[error("auth service unreachable: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("auth service call failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("token rejected: {0}")]
    InvalidToken(String),

    #[error("auth service returned a malformed payload: {0}")]
    BadPayload(String),
}

/// Identity attached to a validated token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Typed client for the auth-service trust boundary.
///
/// Cloning is cheap: the underlying channel is shared and multiplexes
/// requests over one HTTP/2 connection.
#[derive(Debug, Clone)]
pub struct AuthClient {
    inner: AuthServiceClient<Channel>,
}

impl AuthClient {
    /// Connect over plaintext, e.g. `http://auth-service:50051`.
    pub async fn connect(addr: &str) -> Result<Self, AuthClientError> {
        let channel = Endpoint::from_shared(addr.to_string())
            .map_err(AuthClientError::Transport)?
            .connect()
            .await?;
        Ok(Self {
            inner: AuthServiceClient::new(channel),
        })
    }

    /// Connect with TLS, trusting the given CA certificate (PEM).
    pub async fn connect_tls(
        addr: &str,
        ca_pem: &[u8],
        domain: &str,
    ) -> Result<Self, AuthClientError> {
        let tls = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(ca_pem))
            .domain_name(domain);
        let channel = Endpoint::from_shared(addr.to_string())
            .map_err(AuthClientError::Transport)?
            .tls_config(tls)?
            .connect()
            .await?;
        Ok(Self {
            inner: AuthServiceClient::new(channel),
        })
    }

    /// Validate a bearer token and return the identity it carries.
    ///
    /// Business rejections (expired, forged, malformed tokens) surface as
    /// `InvalidToken`; only transport and server faults become `Rpc`.
    pub async fn validate_token(&self, token: &str) -> Result<ValidatedUser, AuthClientError> {
        let mut request = Request::new(TokenRequest {
            token: token.to_string(),
        });
        request.set_timeout(VALIDATE_TIMEOUT);

        let response = self.inner.clone().validate_token(request).await?.into_inner();
        if !response.valid {
            return Err(AuthClientError::InvalidToken(response.error));
        }

        let user_id = Uuid::parse_str(&response.user_id)
            .map_err(|e| AuthClientError::BadPayload(format!("user_id: {}", e)))?;
        Ok(ValidatedUser {
            user_id,
            email: response.email,
        })
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, AuthClientError> {
        let response = self
            .inner
            .clone()
            .register(RegisterRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        Ok(response.into_inner())
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, AuthClientError> {
        let response = self
            .inner
            .clone()
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        Ok(response.into_inner())
    }
}
