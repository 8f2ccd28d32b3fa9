/// Auth Service Main Entry Point
///
/// Starts the gRPC server with:
/// - PostgreSQL connection pool (migrations run at startup)
/// - AMQP event publisher (optional)
/// - TLS listener when configured
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::{info, warn};

use auth_service::config::Settings;
use auth_service::grpc::server::subs::auth::auth_service_server::AuthServiceServer;
use auth_service::grpc::AuthGrpcServer;
use auth_service::security::TokenCodec;
use auth_service::services::{AuthService, EventPublisher, PgUserStore, RabbitPublisher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "auth_service=info,info".into()),
        )
        .with_target(false)
        .json()
        .init();

    info!("Starting Auth Service");

    let settings = Settings::load().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    // Database pool + migrations
    let db_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout))
        .connect(&settings.database.url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    // AMQP publisher (optional)
    let publisher: Option<Arc<dyn EventPublisher>> = match &settings.amqp.url {
        Some(url) => {
            let publisher = RabbitPublisher::connect(url, &settings.amqp.exchange)
                .await
                .context("Failed to connect to AMQP broker")?;
            Some(Arc::new(publisher))
        }
        None => {
            info!("AMQP_URL not configured; running without event publishing");
            None
        }
    };

    let tokens = TokenCodec::new(&settings.jwt.secret).context("Failed to build token codec")?;
    let service = AuthService::new(Arc::new(PgUserStore::new(db_pool)), publisher, tokens);

    let addr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("Starting gRPC server on {}", addr);

    let mut server_builder = Server::builder();
    match &settings.server.tls {
        Some(tls) => {
            let cert = tokio::fs::read(&tls.cert_file)
                .await
                .context("Failed to read TLS_CERT_FILE")?;
            let key = tokio::fs::read(&tls.key_file)
                .await
                .context("Failed to read TLS_KEY_FILE")?;
            server_builder = server_builder
                .tls_config(ServerTlsConfig::new().identity(Identity::from_pem(cert, key)))
                .context("Failed to configure gRPC TLS")?;
            info!("gRPC TLS enabled");
        }
        None => {
            warn!("TLS disabled - serving plaintext gRPC (development only)");
        }
    }

    server_builder
        .add_service(AuthServiceServer::new(AuthGrpcServer::new(service)))
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .context("gRPC server error")?;

    info!("Auth service shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutting down gracefully...");
}
