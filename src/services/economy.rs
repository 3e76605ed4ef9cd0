// SPDX-License-Identifier: MIT

//! Powerup economy service.
//!
//! Orchestrates the core operations:
//! 1. Purchase: debit a balance, add to the inventory stack
//! 2. Activate: move units from inventory into a timed active effect
//! 3. List active: expiry-filtered read of live effects
//! 4. Apply reward: credit coins boosted by the strongest live multiplier
//!
//! Every mutation runs the pure state machine on [`User`] inside a single
//! Firestore transaction, so concurrent requests for the same user never
//! observe or leave behind a partial update.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{ActiveEffectView, PowerupStack, PriceRail, RewardOutcome};
use crate::services::CatalogService;
use std::sync::Arc;

/// Result of a successful purchase.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub currency: i64,
    pub tokens: i64,
    pub inventory: Vec<PowerupStack>,
}

/// Business logic for the powerup economy.
#[derive(Clone)]
pub struct EconomyService {
    db: FirestoreDb,
    catalog: Arc<CatalogService>,
}

impl EconomyService {
    pub fn new(db: FirestoreDb, catalog: Arc<CatalogService>) -> Self {
        Self { db, catalog }
    }

    /// Purchase one unit of an item, paying via `rail`.
    pub async fn purchase(
        &self,
        user_id: &str,
        item_id: &str,
        rail: PriceRail,
    ) -> Result<PurchaseOutcome> {
        let item = self.catalog.get_item(item_id).await?;

        tracing::info!(user_id, item_id, ?rail, price = item.price, "Purchasing item");

        self.db
            .update_user_atomic(user_id, |user| {
                user.apply_purchase(&item, rail, chrono::Utc::now())?;
                Ok(PurchaseOutcome {
                    currency: user.currency,
                    tokens: user.tokens,
                    inventory: sorted_inventory(user),
                })
            })
            .await
    }

    /// Activate `n` owned units of an item.
    ///
    /// Returns the expiry-filtered active effects after the activation.
    pub async fn activate(
        &self,
        user_id: &str,
        item_id: &str,
        n: u32,
    ) -> Result<Vec<ActiveEffectView>> {
        let item = self.catalog.get_item(item_id).await?;

        tracing::info!(user_id, item_id, n, "Activating powerup");

        self.db
            .update_user_atomic(user_id, |user| {
                let now = chrono::Utc::now();
                let until = user.apply_activation(&item, n, now)?;
                tracing::debug!(
                    user_id,
                    item_id,
                    until = %crate::time_utils::format_utc_rfc3339(until),
                    "Powerup active"
                );
                Ok(user.active_effects_at(now))
            })
            .await
    }

    /// Expiry-filtered list of a user's live effects.
    ///
    /// Pure read: lapsed effects are filtered out of the response but left
    /// in storage for the next writing path to prune.
    pub async fn list_active(&self, user_id: &str) -> Result<Vec<ActiveEffectView>> {
        let user = self
            .db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        Ok(user.active_effects_at(chrono::Utc::now()))
    }

    /// Credit a reward boosted by the strongest live multiplier.
    pub async fn apply_reward(&self, user_id: &str, base_amount: i64) -> Result<RewardOutcome> {
        if base_amount < 0 {
            return Err(AppError::BadRequest(
                "Reward base amount cannot be negative".to_string(),
            ));
        }

        let outcome = self
            .db
            .update_user_atomic(user_id, |user| {
                Ok(user.apply_reward(base_amount, chrono::Utc::now()))
            })
            .await?;

        tracing::info!(
            user_id,
            base = outcome.base_amount,
            boosted = outcome.boosted_amount,
            multiplier = outcome.multiplier,
            "Reward applied"
        );

        Ok(outcome)
    }
}

/// Inventory stacks sorted by item ID for stable API output.
fn sorted_inventory(user: &crate::models::User) -> Vec<PowerupStack> {
    let mut stacks: Vec<PowerupStack> = user.inventory.values().cloned().collect();
    stacks.sort_by(|a, b| a.item_id.cmp(&b.item_id));
    stacks
}
