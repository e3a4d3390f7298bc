pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod peer;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;
pub use api::{ApiError, AppState};

pub use config::AppConfig;
pub use logic::Expander;

// Export all model types
pub use model::*;

pub use peer::{HttpPeerClient, PeerResolver, Resolution};

// Export store types
pub use store::{MemoryStore, PostgresStore, Store};

use std::sync::Arc;

use crate::config::StoreBackend;

/// Connect the configured store and serve the configured registry until the
/// listener fails.
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let peers: Arc<dyn PeerResolver> = Arc::new(HttpPeerClient::new(
        &config.peers.base_url,
        config.peer_timeout(),
    )?);
    log::info!(
        "Resolving sibling registries through {} ({}s timeout)",
        config.peers.base_url,
        config.peers.timeout_secs
    );

    match config.store.backend {
        StoreBackend::Postgres => {
            let database_url = config.database_url()?;
            log::info!("Connecting to PostgreSQL...");
            let postgres_store = PostgresStore::new(
                &database_url,
                config.database.max_connections.unwrap_or(20),
                config.database_timeout(),
            )
            .await?;
            postgres_store.migrate().await?;
            log::info!("Database ready");

            serve(Arc::new(postgres_store), peers, &config).await
        }
        StoreBackend::Memory => {
            log::warn!("Using the in-memory store; records are lost on shutdown");
            serve(Arc::new(MemoryStore::new()), peers, &config).await
        }
    }
}

async fn serve<S: Store + 'static>(
    store: Arc<S>,
    peers: Arc<dyn PeerResolver>,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let app = routes::create_router::<S>(config.service.kind)?
        .with_state(AppState::new(store, peers));

    let bind_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log::info!(
        "{} registry running on http://{}",
        config.service.kind.singular(),
        bind_address
    );

    axum::serve(listener, app).await?;

    Ok(())
}
