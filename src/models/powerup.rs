// SPDX-License-Identifier: MIT

//! Powerup inventory and active-effect models.
//!
//! A user's powerups live in two typed maps keyed by item ID:
//! owned-but-inactive stacks, and currently active timed effects. Keying
//! by item ID makes "one stack per item" and "one active effect per item"
//! structural instead of something a linear scan has to enforce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::store::{ItemKind, StoreItem};
use crate::time_utils::format_utc_rfc3339;

/// Owned, inactive powerup units for one item.
///
/// Invariant: a stack present in a user's inventory has `count >= 1`.
/// Stacks that reach zero through activation are removed, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PowerupStack {
    /// Catalog item ID
    pub item_id: String,
    /// Display name (denormalized from the catalog at purchase time)
    pub name: String,
    /// Effect category
    pub kind: ItemKind,
    /// Effect magnitude
    pub value: f64,
    /// Effect duration per unit in minutes
    pub duration_minutes: u32,
    /// Number of units owned
    pub count: u32,
}

impl PowerupStack {
    /// Build a one-unit stack from a catalog item.
    pub fn from_item(item: &StoreItem) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            kind: item.kind,
            value: item.value,
            duration_minutes: item.duration_minutes.unwrap_or(0),
            count: 1,
        }
    }
}

/// An activated, time-bounded powerup effect.
///
/// `active_until` is the persisted source of truth; remaining time is
/// derived at read time and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Catalog item ID
    pub item_id: String,
    /// Display name
    pub name: String,
    /// Effect category
    pub kind: ItemKind,
    /// Effect magnitude
    pub value: f64,
    /// Absolute expiry timestamp
    pub active_until: DateTime<Utc>,
}

impl ActiveEffect {
    /// Whether the effect is still live at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active_until > now
    }

    /// Read-time view with derived remaining seconds.
    pub fn view_at(&self, now: DateTime<Utc>) -> ActiveEffectView {
        let remaining = (self.active_until - now).num_seconds().max(0);
        ActiveEffectView {
            item_id: self.item_id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            value: self.value,
            active_until: format_utc_rfc3339(self.active_until),
            remaining_seconds: remaining,
        }
    }
}

/// API view of an active effect.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActiveEffectView {
    pub item_id: String,
    pub name: String,
    pub kind: ItemKind,
    pub value: f64,
    /// Expiry timestamp (RFC3339)
    pub active_until: String,
    /// Seconds until expiry, clamped at 0
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub remaining_seconds: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn effect(until: DateTime<Utc>) -> ActiveEffect {
        ActiveEffect {
            item_id: "coin-boost-2x".to_string(),
            name: "2x Coin Boost".to_string(),
            kind: ItemKind::Multiplier,
            value: 2.0,
            active_until: until,
        }
    }

    #[test]
    fn test_is_live_boundary() {
        let now = Utc::now();
        assert!(effect(now + Duration::seconds(1)).is_live(now));
        // Expiry exactly at `now` counts as lapsed
        assert!(!effect(now).is_live(now));
        assert!(!effect(now - Duration::seconds(1)).is_live(now));
    }

    #[test]
    fn test_view_remaining_seconds_clamped() {
        let now = Utc::now();

        let live = effect(now + Duration::minutes(5)).view_at(now);
        assert_eq!(live.remaining_seconds, 300);

        let lapsed = effect(now - Duration::minutes(5)).view_at(now);
        assert_eq!(lapsed.remaining_seconds, 0);
    }
}
