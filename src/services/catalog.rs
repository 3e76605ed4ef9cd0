// SPDX-License-Identifier: MIT

//! Store catalog service.
//!
//! The catalog is read-mostly: seeded once at bootstrap and then served
//! from an in-process cache, falling back to Firestore on a miss.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{ItemKind, PriceRail, StoreItem};
use dashmap::DashMap;

/// Catalog of purchasable items with an in-process cache.
pub struct CatalogService {
    db: FirestoreDb,
    cache: DashMap<String, StoreItem>,
}

impl CatalogService {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            cache: DashMap::new(),
        }
    }

    /// Default catalog contents used for the idempotent bootstrap seed.
    pub fn default_items() -> Vec<StoreItem> {
        vec![
            StoreItem {
                id: "coin-boost-1.5x".to_string(),
                name: "1.5x Coin Boost".to_string(),
                description: "Earn 1.5x more coins for every correct answer for 30 minutes"
                    .to_string(),
                price: 1,
                price_rail: PriceRail::Token,
                kind: ItemKind::Multiplier,
                duration_minutes: Some(30),
                value: 1.5,
                image: "/images/shop/boost-1.5x.png".to_string(),
            },
            StoreItem {
                id: "coin-boost-2x".to_string(),
                name: "2x Coin Boost".to_string(),
                description: "Earn 2x more coins for every correct answer for 30 minutes"
                    .to_string(),
                price: 2,
                price_rail: PriceRail::Token,
                kind: ItemKind::Multiplier,
                duration_minutes: Some(30),
                value: 2.0,
                image: "/images/shop/boost-2x.png".to_string(),
            },
            StoreItem {
                id: "coin-boost-30m".to_string(),
                name: "30-Minute Coin Boost".to_string(),
                description: "Earn 1.25x more coins for every correct answer for 30 minutes"
                    .to_string(),
                price: 300,
                price_rail: PriceRail::Coin,
                kind: ItemKind::Multiplier,
                duration_minutes: Some(30),
                value: 1.25,
                image: "/images/shop/timer-30.png".to_string(),
            },
            StoreItem {
                id: "coin-boost-60m".to_string(),
                name: "60-Minute Coin Boost".to_string(),
                description: "Earn 1.5x more coins for every correct answer for 60 minutes"
                    .to_string(),
                price: 500,
                price_rail: PriceRail::Coin,
                kind: ItemKind::Multiplier,
                duration_minutes: Some(60),
                value: 1.5,
                image: "/images/shop/timer-60.png".to_string(),
            },
        ]
    }

    /// Seed the catalog if empty and warm the cache from the store.
    ///
    /// Idempotent: safe to run on every startup. Returns how many items
    /// were newly inserted.
    pub async fn seed_if_empty(&self) -> Result<usize> {
        let inserted = self.db.seed_store_items(&Self::default_items()).await?;

        for item in self.db.list_store_items().await? {
            self.cache.insert(item.id.clone(), item);
        }
        tracing::info!(cached = self.cache.len(), inserted, "Catalog ready");

        Ok(inserted)
    }

    /// Get an item by catalog ID.
    pub async fn get_item(&self, item_id: &str) -> Result<StoreItem> {
        if let Some(item) = self.cache.get(item_id) {
            return Ok(item.clone());
        }

        // Cache miss: the item may have been added after startup.
        let item = self
            .db
            .get_store_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Store item {} not found", item_id)))?;
        self.cache.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    /// List all catalog items, sorted by ID for stable output.
    pub async fn list_items(&self) -> Result<Vec<StoreItem>> {
        let mut items: Vec<StoreItem> = if self.cache.is_empty() {
            let fetched = self.db.list_store_items().await?;
            for item in &fetched {
                self.cache.insert(item.id.clone(), item.clone());
            }
            fetched
        } else {
            self.cache.iter().map(|e| e.value().clone()).collect()
        };

        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }
}
