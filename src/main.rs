// SPDX-License-Identifier: MIT

//! SatQuest API Server
//!
//! Serves the powerup economy for the SAT-practice app: shop catalog,
//! purchases, powerup activation, and boosted reward resolution.

use satquest_api::{
    config::Config,
    db::FirestoreDb,
    services::{CatalogService, EconomyService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting SatQuest API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Seed the store catalog (idempotent) and warm the cache
    let catalog = Arc::new(CatalogService::new(db.clone()));
    let inserted = catalog
        .seed_if_empty()
        .await
        .expect("Failed to seed store catalog");
    if inserted > 0 {
        tracing::info!(inserted, "Seeded default store items");
    }

    let economy = EconomyService::new(db.clone(), catalog.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        catalog,
        economy,
    });

    // Build router
    let app = satquest_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("satquest_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
