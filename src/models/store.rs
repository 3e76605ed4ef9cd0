// SPDX-License-Identifier: MIT

//! Store catalog model.

use serde::{Deserialize, Serialize};

/// Which balance an item is paid from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum PriceRail {
    Coin,
    Token,
}

/// Effect category of a store item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Boost,
    Multiplier,
    Theme,
    Avatar,
}

/// Purchasable item definition stored in Firestore.
///
/// Seeded once at bootstrap and treated as immutable afterwards. The `id`
/// is the document ID and the only identity used anywhere; names are
/// display-only and never normalized into keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StoreItem {
    /// Opaque stable item ID (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Display description
    pub description: String,
    /// Price in units of the price rail
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub price: i64,
    /// Balance the price is debited from
    pub price_rail: PriceRail,
    /// Effect category
    pub kind: ItemKind,
    /// Effect duration in minutes (None for items without a timed effect)
    pub duration_minutes: Option<u32>,
    /// Effect magnitude (multiplier factor for `ItemKind::Multiplier`)
    pub value: f64,
    /// Shop image path
    pub image: String,
}

impl StoreItem {
    /// Whether this item can be activated into a timed effect.
    pub fn is_activatable(&self) -> bool {
        self.duration_minutes.is_some()
    }
}
