/// gRPC server implementation for auth-service
///
/// Implements the three RPCs from auth_service.proto: Register, Login,
/// ValidateToken. Business failures (duplicate email, wrong password,
/// invalid token) come back as successful responses with success/valid set
/// to false; a gRPC Status means infrastructure broke.
use tonic::{Request, Response, Status};
use tracing::{info, warn};

use crate::error::AuthError;
use crate::services::AuthService;

// Import generated protobuf types
pub mod subs {
    pub mod auth {
        tonic::include_proto!("subs.auth");
    }
}

use subs::auth::auth_service_server::AuthService as AuthServiceRpc;
use subs::auth::*;

/// Trust-boundary server wrapping the credential service
#[derive(Clone)]
pub struct AuthGrpcServer {
    service: AuthService,
}

impl AuthGrpcServer {
    pub fn new(service: AuthService) -> Self {
        Self { service }
    }
}

/// Business failures travel in-band; everything else escalates to Status
fn is_business_failure(err: &AuthError) -> bool {
    matches!(
        err,
        AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::PasswordTooLong
            | AuthError::EmailTaken
            | AuthError::InvalidCredentials
            | AuthError::Token(_)
    )
}

#[tonic::async_trait]
impl AuthServiceRpc for AuthGrpcServer {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> std::result::Result<Response<RegisterResponse>, Status> {
        let req = request.into_inner();

        match self.service.register(&req.email, &req.password).await {
            Ok(user) => {
                info!(user_id = %user.id, "Register RPC succeeded");
                Ok(Response::new(RegisterResponse {
                    user_id: user.id.to_string(),
                    email: user.email,
                    success: true,
                    message: "User registered successfully".to_string(),
                    error: String::new(),
                }))
            }
            Err(e) if is_business_failure(&e) => Ok(Response::new(RegisterResponse {
                user_id: String::new(),
                email: String::new(),
                success: false,
                message: String::new(),
                error: e.to_string(),
            })),
            Err(e) => Err(e.to_status()),
        }
    }

    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> std::result::Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();

        match self.service.login(&req.email, &req.password).await {
            Ok((token, user)) => {
                info!(user_id = %user.id, "Login RPC succeeded");
                Ok(Response::new(LoginResponse {
                    token,
                    user_id: user.id.to_string(),
                    email: user.email,
                    success: true,
                    message: "Login successful".to_string(),
                    error: String::new(),
                }))
            }
            Err(e) if is_business_failure(&e) => Ok(Response::new(LoginResponse {
                token: String::new(),
                user_id: String::new(),
                email: String::new(),
                success: false,
                message: String::new(),
                error: e.to_string(),
            })),
            Err(e) => Err(e.to_status()),
        }
    }

    async fn validate_token(
        &self,
        request: Request<TokenRequest>,
    ) -> std::result::Result<Response<UserResponse>, Status> {
        let req = request.into_inner();

        match self.service.validate_token(&req.token) {
            Ok(claims) => Ok(Response::new(UserResponse {
                user_id: claims.sub.to_string(),
                email: claims.email,
                valid: true,
                error: String::new(),
            })),
            Err(e) => {
                // Log the precise reason, answer with a uniform rejection
                // so callers learn nothing about why the token failed.
                warn!(reason = %e, "Token validation failed");
                Ok(Response::new(UserResponse {
                    user_id: String::new(),
                    email: String::new(),
                    valid: false,
                    error: "Invalid token".to_string(),
                }))
            }
        }
    }
}
