//! DeckVault Service - HTTP API for credits and submissions
//!
//! This is the main entry point for the deckvault service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckvault_service::{create_router, AppState, HttpMembershipDirectory, ServiceConfig};
use deckvault_store::PgLedgerStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,deckvault=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DeckVault Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        membership_api_url = %config.membership_api_url,
        "Service configuration loaded"
    );

    // Connect to PostgreSQL and apply migrations
    let store = PgLedgerStore::connect(&config.database_url, config.db_max_connections).await?;
    store.run_migrations().await?;
    tracing::info!("Database connected, migrations applied");

    // Membership identity upstream
    let members = HttpMembershipDirectory::new(
        &config.membership_api_url,
        config.membership_service_key.clone(),
    )?;

    // Build app state
    let state = AppState::new(Arc::new(store), Arc::new(members), config.clone());

    // Create the router
    let app = create_router(state);

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
