/// gRPC client library
///
/// Centralizes client code generation for the auth-service trust boundary
/// and provides a typed wrapper with sane deadlines for callers that gate
/// requests on token validity.
pub mod auth_client;

pub use auth_client::{AuthClient, AuthClientError, ValidatedUser};

// Generated proto client modules
pub mod subs {
    pub mod auth {
        tonic::include_proto!("subs.auth");
    }
}
