//! Storefront - cart, pricing and checkout service

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::checkout::CheckoutServices;
use storefront::config::Config;
use storefront::http::{router, AppState, SessionCarts};
use storefront::infrastructure::{InMemoryCatalog, NatsEventPublisher, PgOrderStore, PgProfileStore};
use storefront::PricingEngine;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let catalog = match &config.catalog_path {
        Some(path) => InMemoryCatalog::from_json_file(path)?,
        None => {
            tracing::warn!("CATALOG_PATH not set, serving an empty catalog");
            InMemoryCatalog::default()
        }
    };

    let events = match &config.nats_url {
        Some(url) => match NatsEventPublisher::connect(url).await {
            Ok(publisher) => Some(publisher),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, domain events will not be published");
                None
            }
        },
        None => None,
    };

    let checkout = CheckoutServices::new(Arc::new(PgOrderStore::new(db.clone())), Arc::new(PgProfileStore::new(db)))
        .with_pricing(PricingEngine::new(config.pricing))
        .with_hydration_timeout(config.hydration_timeout);
    let state = AppState { catalog: Arc::new(catalog), carts: SessionCarts::default(), checkout, events };

    tracing::info!("🚀 Storefront listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, router(state)).await?;
    Ok(())
}
