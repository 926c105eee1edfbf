//! # Tarifa Admin API
//!
//! JSON-over-HTTP server for the pricing admin UI.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Admin API Server                             │
//! │                                                                     │
//! │  Admin UI ───► HTTP (8080) ───► handlers ───► tarifa-db ───► SQLite │
//! │                                    │                                │
//! │                                    ▼                                │
//! │                               tarifa-core                           │
//! │                          (pure pricing rules)                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod dto;
mod error;
mod handlers;
mod routes;

use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tarifa_db::{Database, DbConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tarifa_admin_api=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tarifa admin API server");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        environment = %config.environment,
        db_path = %config.database.path,
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(
        DbConfig::new(&config.database.path)
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections),
    )
    .await?;
    info!("Database ready");

    // Build application
    let app = routes::create_app(AppState { db: db.clone() });

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
