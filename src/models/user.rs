// SPDX-License-Identifier: MIT

//! User model and the powerup economy state machine.
//!
//! All economy mutations are pure methods on [`User`]: they either apply
//! fully or return an error leaving the record untouched. The database
//! layer runs these methods inside a Firestore transaction, so every
//! multi-field change (balance + inventory, inventory + active effect)
//! commits as a single atomic write.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AppError;
use crate::models::powerup::{ActiveEffect, ActiveEffectView, PowerupStack};
use crate::models::store::{ItemKind, PriceRail, StoreItem};

/// User document stored in Firestore, keyed by `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Opaque user ID (also used as document ID)
    pub user_id: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name
    pub display_name: String,
    /// Coin balance, never negative
    #[serde(default)]
    pub currency: i64,
    /// Token balance, never negative
    #[serde(default)]
    pub tokens: i64,
    /// Owned, inactive powerup stacks keyed by item ID
    #[serde(default)]
    pub inventory: HashMap<String, PowerupStack>,
    /// Active timed effects keyed by item ID
    #[serde(default)]
    pub active_effects: HashMap<String, ActiveEffect>,
    /// When the user record was created (ISO 8601)
    pub created_at: String,
    /// Last mutation timestamp (ISO 8601)
    pub updated_at: String,
}

/// Result of applying a reward with the multiplier resolver.
#[derive(Debug, Clone, Copy, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RewardOutcome {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub base_amount: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub boosted_amount: i64,
    pub multiplier: f64,
}

impl User {
    /// Create a fresh user record with starting balances.
    pub fn new(
        user_id: &str,
        email: Option<String>,
        display_name: &str,
        starting_currency: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let stamp = crate::time_utils::format_utc_rfc3339(now);
        Self {
            user_id: user_id.to_string(),
            email,
            display_name: display_name.to_string(),
            currency: starting_currency,
            tokens: 0,
            inventory: HashMap::new(),
            active_effects: HashMap::new(),
            created_at: stamp.clone(),
            updated_at: stamp,
        }
    }

    /// Balance for a price rail.
    pub fn balance(&self, rail: PriceRail) -> i64 {
        match rail {
            PriceRail::Coin => self.currency,
            PriceRail::Token => self.tokens,
        }
    }

    fn debit(&mut self, rail: PriceRail, amount: i64) {
        match rail {
            PriceRail::Coin => self.currency -= amount,
            PriceRail::Token => self.tokens -= amount,
        }
    }

    /// Purchase one unit of `item`, paying via `rail`.
    ///
    /// Debits the rail balance and adds a unit to the item's inventory
    /// stack (creating the stack if absent). Fails without side effects if
    /// the rail does not match the item or the balance is too low.
    pub fn apply_purchase(
        &mut self,
        item: &StoreItem,
        rail: PriceRail,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if rail != item.price_rail {
            return Err(AppError::BadRequest(format!(
                "Item {} is not payable with the {:?} rail",
                item.id, rail
            )));
        }
        if self.balance(rail) < item.price {
            return Err(AppError::InsufficientFunds(format!(
                "Item {} costs {}, balance is {}",
                item.id,
                item.price,
                self.balance(rail)
            )));
        }

        self.debit(rail, item.price);
        self.inventory
            .entry(item.id.clone())
            .and_modify(|stack| stack.count += 1)
            .or_insert_with(|| PowerupStack::from_item(item));
        self.touch(now);
        Ok(())
    }

    /// Activate `n` owned units of `item` into a timed effect.
    ///
    /// Decrements the stack by `n` (removing it at zero) and creates or
    /// extends the item's active effect. Extension anchors on the later of
    /// `now` and the current expiry, so reactivating before expiry never
    /// discards remaining time. Returns the new expiry.
    pub fn apply_activation(
        &mut self,
        item: &StoreItem,
        n: u32,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AppError> {
        if n == 0 {
            return Err(AppError::BadRequest(
                "Activation count must be at least 1".to_string(),
            ));
        }
        let duration_minutes = item.duration_minutes.ok_or_else(|| {
            AppError::BadRequest(format!("Item {} has no timed effect", item.id))
        })?;

        let owned = self.inventory.get(&item.id).map(|s| s.count).unwrap_or(0);
        if owned < n {
            return Err(AppError::InsufficientInventory(format!(
                "Cannot activate {} of item {}, only {} owned",
                n, item.id, owned
            )));
        }

        let added = Duration::minutes(i64::from(duration_minutes) * i64::from(n));
        let anchor = match self.active_effects.get(&item.id) {
            Some(effect) => effect.active_until.max(now),
            None => now,
        };
        let new_until = anchor + added;

        if owned == n {
            self.inventory.remove(&item.id);
        } else if let Some(stack) = self.inventory.get_mut(&item.id) {
            stack.count -= n;
        }

        self.active_effects
            .entry(item.id.clone())
            .and_modify(|effect| effect.active_until = new_until)
            .or_insert_with(|| ActiveEffect {
                item_id: item.id.clone(),
                name: item.name.clone(),
                kind: item.kind,
                value: item.value,
                active_until: new_until,
            });
        self.touch(now);
        Ok(new_until)
    }

    /// Expiry-filtered view of active effects, sorted by item ID.
    ///
    /// Pure read: lapsed effects are skipped, not removed. Removal happens
    /// lazily on paths that already write (see [`User::apply_reward`]).
    pub fn active_effects_at(&self, now: DateTime<Utc>) -> Vec<ActiveEffectView> {
        let mut views: Vec<ActiveEffectView> = self
            .active_effects
            .values()
            .filter(|e| e.is_live(now))
            .map(|e| e.view_at(now))
            .collect();
        views.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        views
    }

    /// Highest live multiplier value, defaulting to 1.0.
    ///
    /// Highest-wins: simultaneously active multipliers never stack.
    pub fn highest_multiplier_at(&self, now: DateTime<Utc>) -> f64 {
        self.active_effects
            .values()
            .filter(|e| e.is_live(now) && e.kind == ItemKind::Multiplier)
            .map(|e| e.value)
            .fold(1.0, f64::max)
    }

    /// Credit a reward, boosted by the strongest live multiplier.
    ///
    /// Also prunes lapsed effects as incidental garbage collection, since
    /// the caller is about to persist the record anyway.
    pub fn apply_reward(&mut self, base_amount: i64, now: DateTime<Utc>) -> RewardOutcome {
        let multiplier = self.highest_multiplier_at(now);
        // The f64 -> i64 cast saturates at i64::MAX, and so does the
        // credit, so an oversized amount can never wrap the balance.
        let boosted_amount = (base_amount as f64 * multiplier).floor() as i64;

        self.currency = self.currency.saturating_add(boosted_amount);
        self.prune_expired(now);
        self.touch(now);

        RewardOutcome {
            base_amount,
            boosted_amount,
            multiplier,
        }
    }

    /// Remove lapsed effects. Returns how many were dropped.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.active_effects.len();
        self.active_effects.retain(|_, e| e.is_live(now));
        before - self.active_effects.len()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = crate::time_utils::format_utc_rfc3339(now);
    }
}
