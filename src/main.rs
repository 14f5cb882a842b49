//! UpStore - storefront catalog and back-office service

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upstore::api::{build_router, AppState, ServerConfig};
use upstore::services::{seed_defaults, EventSink, LogoLibrary};
use upstore::store::{CatalogStore, PgCatalogStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "upstore=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    let store: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(db));

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "NATS unavailable, catalog events disabled");
                None
            }
        },
        None => None,
    };

    if config.seed_defaults {
        seed_defaults(store.clone(), config.seed_admin.as_ref()).await?;
    }

    let logos = LogoLibrary::new(&config.logos_dir, &config.logos_url_prefix);
    let state = AppState::new(store, EventSink::new(nats), logos, config.session.clone());
    let app = build_router(state);

    let addr = config.bind_addr();
    tracing::info!("🚀 UpStore listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
