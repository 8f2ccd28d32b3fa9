/// Auth Service Library
///
/// Provides credential management and token issuance behind a gRPC trust
/// boundary.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `db`: Database repository (users)
/// - `error`: Error types
/// - `grpc`: gRPC server implementation
/// - `models`: Data models
/// - `security`: Password hashing and the JWT codec
/// - `services`: Business logic (credential service, event publisher)
/// - `validators`: Input validation
pub mod config;
pub mod db;
pub mod error;
pub mod grpc;
pub mod models;
pub mod security;
pub mod services;
pub mod validators;

// Re-export commonly used types
pub use error::{AuthError, Result};
pub use grpc::AuthGrpcServer;
