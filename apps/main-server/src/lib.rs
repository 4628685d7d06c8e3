//! Doctors Portal Server
//!
//! HTTP backend for booking treatment appointments: availability lookups,
//! bookings, user roles, the doctor directory and card payments.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use auth::{JwtConfig, JwtManager};
use axum::Router;
use booking_store::BookingStore;
use entities::TreatmentOption;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, LogFormat};
use crate::services::PaymentGateway;
use crate::state::{AppState, SharedState};

/// Creates the application router with all routes configured.
pub fn create_app<S: BookingStore + 'static>(state: SharedState<S>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}

/// Creates the application state with the given configuration and store.
pub fn create_state<S: BookingStore>(
    config: Config,
    store: S,
    gateway: Option<Arc<dyn PaymentGateway>>,
) -> SharedState<S> {
    let jwt_config =
        JwtConfig::new(&config.jwt_secret).with_expiration_hours(config.jwt_expiration_hours);
    let jwt_manager = JwtManager::new(jwt_config);

    Arc::new(AppState::new(&config, Arc::new(store), jwt_manager, gateway))
}

/// Inserts the treatment options listed in a JSON file, skipping names that
/// are already in the catalog. Returns the number of inserted options.
pub async fn seed_catalog<S: BookingStore + ?Sized>(store: &S, path: &Path) -> anyhow::Result<usize> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read catalog file {}", path.display()))?;
    let options: Vec<TreatmentOption> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse catalog file {}", path.display()))?;

    let mut inserted = 0;
    for option in options {
        if store.get_treatment_option(&option.name).await?.is_some() {
            tracing::debug!(name = %option.name, "Treatment already in catalog");
            continue;
        }
        store.create_treatment_option(option).await?;
        inserted += 1;
    }

    tracing::info!(inserted, path = %path.display(), "Catalog seeded");

    Ok(inserted)
}

/// Initializes tracing with the given log level and format.
///
/// `RUST_LOG` takes precedence over `log_level`.
pub fn init_tracing(log_level: &str, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
