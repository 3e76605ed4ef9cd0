// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod catalog;
pub mod economy;

pub use catalog::CatalogService;
pub use economy::{EconomyService, PurchaseOutcome};
