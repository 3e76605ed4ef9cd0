// SPDX-License-Identifier: MIT

use satquest_api::config::Config;
use satquest_api::db::FirestoreDb;
use satquest_api::middleware::auth::create_jwt;
use satquest_api::models::User;
use satquest_api::routes::create_router;
use satquest_api::services::{CatalogService, EconomyService};
use satquest_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let catalog = Arc::new(CatalogService::new(db.clone()));
    let economy = EconomyService::new(db.clone(), catalog.clone());

    let state = Arc::new(AppState {
        config,
        db,
        catalog,
        economy,
    });

    (create_router(state.clone()), state)
}

/// Create a signed session token for tests.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("Failed to create JWT")
}

/// Create an emulator-backed economy setup with a seeded catalog and one
/// user holding the given balances.
#[allow(dead_code)]
pub async fn seeded_economy(
    user_id: &str,
    currency: i64,
    tokens: i64,
) -> (FirestoreDb, EconomyService) {
    let db = test_db().await;

    let catalog = Arc::new(CatalogService::new(db.clone()));
    catalog
        .seed_if_empty()
        .await
        .expect("Failed to seed catalog");

    let mut user = User::new(
        user_id,
        Some(format!("{}@example.com", user_id)),
        "Test Student",
        currency,
        chrono::Utc::now(),
    );
    user.tokens = tokens;
    db.upsert_user(&user).await.expect("Failed to create user");

    (db.clone(), EconomyService::new(db, catalog))
}
