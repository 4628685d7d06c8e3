//! Doctors Portal Server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use booking_store::{BookingStore, MemoryBookingStore, SqliteBookingStore};
use portal_server::{
    config::Config,
    create_app, create_state, init_tracing, seed_catalog,
    services::{PaymentGateway, StripeGateway},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        persistent = config.database_url.is_some(),
        payments = config.payments_configured(),
        "Starting Doctors Portal Server"
    );

    match config.database_url.clone() {
        Some(url) => {
            let store = SqliteBookingStore::connect(&url).await?;
            tracing::info!(url = %url, "Using SQLite store");
            serve(config, store).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data will not survive a restart");
            serve(config, MemoryBookingStore::new()).await
        }
    }
}

async fn serve<S: BookingStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    if let Some(path) = &config.catalog_file {
        seed_catalog(&store, path).await?;
    }

    let gateway = config
        .stripe_secret_key
        .as_ref()
        .map(|key| Arc::new(StripeGateway::new(key.clone())) as Arc<dyn PaymentGateway>);

    let addr: SocketAddr = config.server_addr().parse()?;
    let app = create_app(create_state(config, store, gateway));

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
