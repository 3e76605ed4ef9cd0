// SPDX-License-Identifier: MIT

//! Bootstrap race tests.
//!
//! A user record is created exactly once. A bootstrap that arrives after
//! other writes have committed must return the stored record untouched
//! instead of resetting balances and inventory to their initial values.

use satquest_api::models::{PriceRail, User};
use satquest_api::services::{CatalogService, EconomyService};
use std::sync::Arc;

mod common;

fn fresh_user(user_id: &str, currency: i64) -> User {
    User::new(
        user_id,
        Some(format!("{}@example.com", user_id)),
        "Test Student",
        currency,
        chrono::Utc::now(),
    )
}

#[tokio::test]
async fn test_late_bootstrap_preserves_committed_purchase() {
    require_emulator!();
    let db = common::test_db().await;
    let catalog = Arc::new(CatalogService::new(db.clone()));
    catalog
        .seed_if_empty()
        .await
        .expect("Failed to seed catalog");
    let economy = EconomyService::new(db.clone(), catalog);

    // Unique ID per run so the first call really creates the record
    let user_id = format!("it-boot-{}", chrono::Utc::now().timestamp_millis());
    db.create_user_if_absent(&fresh_user(&user_id, 10_000))
        .await
        .expect("Bootstrap failed");

    economy
        .purchase(&user_id, "coin-boost-30m", PriceRail::Coin)
        .await
        .expect("Purchase failed");

    // A delayed duplicate bootstrap must not reset the record
    let stored = db
        .create_user_if_absent(&fresh_user(&user_id, 10_000))
        .await
        .expect("Repeat bootstrap failed");

    assert_eq!(
        stored.currency,
        10_000 - 300,
        "Purchase was clobbered by a late bootstrap"
    );
    assert_eq!(stored.inventory.get("coin-boost-30m").unwrap().count, 1);

    let persisted = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(persisted.currency, stored.currency);
    assert_eq!(persisted.inventory.len(), 1);
}

#[tokio::test]
async fn test_concurrent_bootstraps_converge_on_one_record() {
    require_emulator!();
    let db = common::test_db().await;

    let user_id = format!("it-boot-race-{}", chrono::Utc::now().timestamp_millis());

    let mut handles = vec![];
    for _ in 0..5 {
        let db = db.clone();
        let user = fresh_user(&user_id, 500);
        handles.push(tokio::spawn(
            async move { db.create_user_if_absent(&user).await },
        ));
    }

    // Every caller sees the same record regardless of who won the create
    for handle in handles {
        let stored = handle
            .await
            .expect("Task join failed")
            .expect("Bootstrap failed");
        assert_eq!(stored.currency, 500);
    }

    let persisted = db.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(persisted.currency, 500);
}
