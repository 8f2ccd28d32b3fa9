pub mod server;

pub use server::AuthGrpcServer;
