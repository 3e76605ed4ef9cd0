// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod powerup;
pub mod store;
pub mod user;

pub use powerup::{ActiveEffect, ActiveEffectView, PowerupStack};
pub use store::{ItemKind, PriceRail, StoreItem};
pub use user::{RewardOutcome, User};
